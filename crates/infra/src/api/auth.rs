//! Bearer token access and auth-failure notification
//!
//! The transport reads the token through [`AccessTokenProvider`] on every
//! request and clears it when the backend rejects the session. Rejections
//! are broadcast as [`AuthFailure`] events so the application can send the
//! user back to sign-in without the transport knowing about navigation.

use std::sync::Arc;

use async_trait::async_trait;
use smartcal_core::TokenStore;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::errors::ApiError;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Current token, `None` when signed out.
    async fn access_token(&self) -> Result<Option<String>, ApiError>;

    /// Forget the token after the backend rejected it.
    async fn invalidate(&self) -> Result<(), ApiError>;
}

/// Token provider backed by the persistent [`TokenStore`].
pub struct StoredTokenProvider {
    store: Arc<dyn TokenStore>,
}

impl StoredTokenProvider {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AccessTokenProvider for StoredTokenProvider {
    async fn access_token(&self) -> Result<Option<String>, ApiError> {
        let token = self.store.load().map_err(ApiError::from)?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    async fn invalidate(&self) -> Result<(), ApiError> {
        debug!("Clearing rejected session token");
        self.store.clear().map_err(ApiError::from)
    }
}

/// Published whenever a response carries an auth-failure code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    pub code: i64,
    pub message: String,
}

/// Broadcast channel for [`AuthFailure`] events.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthFailure>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new(16)
    }
}

impl AuthEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthFailure> {
        self.sender.subscribe()
    }

    pub fn publish(&self, failure: AuthFailure) {
        if self.sender.send(failure).is_err() {
            warn!("Auth failure raised with no subscribers");
        }
    }
}
