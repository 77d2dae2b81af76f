//! Token store backends
//!
//! The bearer token lives in the platform keychain by default. A JSON file
//! backend covers headless machines without a secret service, and the memory
//! backend is used by tests and one-shot sessions.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use keyring::Entry;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smartcal_core::TokenStore;
use smartcal_domain::constants::TOKEN_KEY;
use smartcal_domain::{AuthConfig, Result, SmartCalError, TokenBackend};
use tracing::debug;

use crate::errors::InfraError;

fn keyring_error(err: keyring::Error) -> SmartCalError {
    InfraError::from(err).into()
}

fn io_error(err: std::io::Error) -> SmartCalError {
    InfraError::from(err).into()
}

/// Token store backed by the platform keychain
pub struct KeychainTokenStore {
    service_name: String,
}

impl KeychainTokenStore {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service_name, TOKEN_KEY).map_err(keyring_error)
    }
}

impl TokenStore for KeychainTokenStore {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_error(e)),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        debug!(service = %self.service_name, "Storing token in keychain");
        self.entry()?.set_password(token).map_err(keyring_error)
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_error(e)),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

/// Token store backed by a JSON file (`{"token": "..."}`)
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/smartcal/token.json`
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("smartcal").join("token.json"))
            .ok_or_else(|| SmartCalError::Config("no user config directory available".into()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(e)),
        };

        let file: TokenFile = serde_json::from_str(&contents).map_err(|e| {
            SmartCalError::Config(format!("corrupt token file {}: {}", self.path.display(), e))
        })?;
        Ok(Some(file.token))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let body = serde_json::to_string(&TokenFile { token: token.to_string() })
            .map_err(|e| SmartCalError::Internal(e.to_string()))?;
        fs::write(&self.path, body).map_err(io_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))
                .map_err(io_error)?;
        }

        debug!(path = %self.path.display(), "Token written");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(e)),
        }
    }
}

/// Process-local token store
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token.read().clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.token.write().take();
        Ok(())
    }
}

/// Read-through cache in front of a slower store.
///
/// The transport reads the token on every request; this keeps those reads
/// off the keychain after the first one. Writes go to the inner store
/// first and only update the cache when they succeed.
pub struct CachedTokenStore {
    inner: Arc<dyn TokenStore>,
    cached: RwLock<Option<Option<String>>>,
}

impl CachedTokenStore {
    pub fn new(inner: Arc<dyn TokenStore>) -> Self {
        Self { inner, cached: RwLock::new(None) }
    }
}

impl TokenStore for CachedTokenStore {
    fn load(&self) -> Result<Option<String>> {
        if let Some(token) = self.cached.read().as_ref() {
            return Ok(token.clone());
        }
        let token = self.inner.load()?;
        *self.cached.write() = Some(token.clone());
        Ok(token)
    }

    fn save(&self, token: &str) -> Result<()> {
        self.inner.save(token)?;
        *self.cached.write() = Some(Some(token.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        // Drop the cached value even if the backend fails so a rejected
        // token is never sent again from this process.
        *self.cached.write() = Some(None);
        self.inner.clear()
    }
}

/// Build the store selected by configuration.
///
/// # Errors
/// `SmartCalError::Config` when the file backend has no path and no user
/// config directory exists.
pub fn build_token_store(config: &AuthConfig) -> Result<Arc<dyn TokenStore>> {
    let store: Arc<dyn TokenStore> = match config.token_backend {
        TokenBackend::Keychain => Arc::new(CachedTokenStore::new(Arc::new(
            KeychainTokenStore::new(config.service_name.clone()),
        ))),
        TokenBackend::File => {
            let path = match &config.token_path {
                Some(path) => PathBuf::from(path),
                None => FileTokenStore::default_path()?,
            };
            Arc::new(CachedTokenStore::new(Arc::new(FileTokenStore::new(path))))
        }
        TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
    };

    debug!(backend = ?config.token_backend, "Token store ready");
    Ok(store)
}
