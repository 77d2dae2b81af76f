//! Port interfaces for credential persistence

use smartcal_domain::Result;

/// Persistent holder of the bearer token.
///
/// Implementations are synchronous: every backend (keychain, file, memory)
/// completes in microseconds and the transport reads the token on each
/// request.
pub trait TokenStore: Send + Sync {
    /// Read the persisted token, `None` when nothing is stored.
    fn load(&self) -> Result<Option<String>>;

    /// Persist `token`, replacing any previous value.
    fn save(&self, token: &str) -> Result<()>;

    /// Remove the persisted token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;
}
