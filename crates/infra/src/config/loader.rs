//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `SMARTCAL_API_BASE` is set, configuration comes from the environment
//! 2. Otherwise the first config file found is loaded
//! 3. With neither, built-in defaults apply
//!
//! ## Environment Variables
//! - `SMARTCAL_API_BASE`: Backend base URL (required for env loading)
//! - `SMARTCAL_API_TIMEOUT_SECS`: Request timeout in seconds
//! - `SMARTCAL_HTTP_MAX_ATTEMPTS`: Attempts for idempotent requests
//! - `SMARTCAL_TOKEN_BACKEND`: `keychain`, `file` or `memory`
//! - `SMARTCAL_TOKEN_PATH`: Token file for the file backend
//! - `SMARTCAL_VOICE_POLL_INTERVAL_MS`: Delay between speech result queries
//! - `SMARTCAL_VOICE_MAX_POLLS`: Speech result queries before giving up
//! - `SMARTCAL_VOICE_INPUT_DEVICE`: Microphone name
//! - `SMARTCAL_LOG_LEVEL`: Default log level when `RUST_LOG` is unset
//! - `SMARTCAL_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./smartcal.json` or `./smartcal.toml` (current working directory)
//! 3. `<user config dir>/smartcal/config.{json,toml}`
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use smartcal_domain::{Config, Result, SmartCalError, TokenBackend};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `SmartCalError::Config` if an environment value or the config
/// file found is invalid.
pub fn load() -> Result<Config> {
    if std::env::var_os("SMARTCAL_API_BASE").is_some() {
        let config = load_from_env()?;
        tracing::info!("Configuration loaded from environment variables");
        return Ok(config);
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::debug!("No configuration source found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Load configuration from environment variables
///
/// `SMARTCAL_API_BASE` must be set; every other variable falls back to its
/// default.
///
/// # Errors
/// Returns `SmartCalError::Config` if the base URL is missing or a value
/// cannot be parsed.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.api.base_url = env_var("SMARTCAL_API_BASE")?;
    if let Some(timeout) = env_parse::<u64>("SMARTCAL_API_TIMEOUT_SECS", "timeout")? {
        config.api.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse::<usize>("SMARTCAL_HTTP_MAX_ATTEMPTS", "max attempts")? {
        config.api.max_attempts = attempts;
    }

    if let Ok(backend) = std::env::var("SMARTCAL_TOKEN_BACKEND") {
        config.auth.token_backend = TokenBackend::from_str(&backend)?;
    }
    config.auth.token_path = std::env::var("SMARTCAL_TOKEN_PATH").ok();

    if let Some(interval) = env_parse::<u64>("SMARTCAL_VOICE_POLL_INTERVAL_MS", "poll interval")? {
        config.voice.poll_interval_ms = interval;
    }
    if let Some(polls) = env_parse::<u32>("SMARTCAL_VOICE_MAX_POLLS", "max polls")? {
        config.voice.max_polls = polls;
    }
    config.voice.input_device = std::env::var("SMARTCAL_VOICE_INPUT_DEVICE").ok();

    if let Ok(level) = std::env::var("SMARTCAL_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("SMARTCAL_LOG_JSON", false);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Sections and fields missing from the file keep their defaults.
///
/// # Errors
/// Returns `SmartCalError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(SmartCalError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            SmartCalError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SmartCalError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| SmartCalError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| SmartCalError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(SmartCalError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("smartcal.json"),
            cwd.join("smartcal.toml"),
        ]);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let dir = config_dir.join("smartcal");
        candidates.extend(vec![dir.join("config.json"), dir.join("config.toml")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("smartcal.json"),
                exe_dir.join("smartcal.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        SmartCalError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional numeric environment variable
fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SmartCalError::Config(format!("Invalid {}: {}", what, e))),
        Err(_) => Ok(None),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
