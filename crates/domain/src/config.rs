//! Configuration structures

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_API_TIMEOUT_SECS, DEFAULT_HTTP_MAX_ATTEMPTS, KEYCHAIN_SERVICE,
    SPEECH_MAX_POLLS, SPEECH_POLL_INTERVAL_MS, SPEECH_SAMPLE_RATE,
};
use crate::errors::SmartCalError;

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub voice: VoiceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    pub timeout_secs: u64,
    /// Attempts for idempotent requests (1 disables retries)
    pub max_attempts: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
        }
    }
}

/// Where the session token is persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenBackend {
    #[default]
    Keychain,
    File,
    Memory,
}

impl std::str::FromStr for TokenBackend {
    type Err = SmartCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keychain" | "keyring" => Ok(Self::Keychain),
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(SmartCalError::Config(format!("Unknown token backend: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token_backend: TokenBackend,
    /// File backend location; defaults to the platform config directory
    pub token_path: Option<String>,
    /// Keychain service name
    pub service_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_backend: TokenBackend::default(),
            token_path: None,
            service_name: KEYCHAIN_SERVICE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub poll_interval_ms: u64,
    pub max_polls: u32,
    pub sample_rate: u32,
    /// Microphone name; the host default when unset
    pub input_device: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: SPEECH_POLL_INTERVAL_MS,
            max_polls: SPEECH_MAX_POLLS,
            sample_rate: SPEECH_SAMPLE_RATE,
            input_device: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
