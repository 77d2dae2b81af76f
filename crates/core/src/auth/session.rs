//! Session state: bearer token plus the signed-in user

use std::sync::Arc;

use parking_lot::RwLock;
use smartcal_domain::{Result, User};
use tracing::{debug, info};

use super::ports::TokenStore;

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
}

/// Authentication state owned by the application context.
///
/// The token is mirrored into the [`TokenStore`] so it survives restarts;
/// the user is kept in memory only and refetched after [`Session::init`].
pub struct Session {
    store: Arc<dyn TokenStore>,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store, state: RwLock::new(SessionState::default()) }
    }

    /// Load the persisted token. A missing token leaves the session empty.
    ///
    /// # Errors
    /// Propagates token store failures.
    pub fn init(&self) -> Result<()> {
        let token = self.store.load()?.filter(|t| !t.is_empty());
        debug!(has_token = token.is_some(), "Session initialised from token store");
        let mut state = self.state.write();
        state.token = token;
        state.user = None;
        Ok(())
    }

    /// Record a successful login or registration.
    ///
    /// # Errors
    /// Returns the token store error; in-memory state is left untouched.
    pub fn set_auth(&self, token: &str, user: User) -> Result<()> {
        self.store.save(token)?;
        info!(user_id = user.id, role = %user.role, "Session established");
        let mut state = self.state.write();
        state.token = Some(token.to_string());
        state.user = Some(user);
        Ok(())
    }

    pub fn set_user(&self, user: User) {
        self.state.write().user = Some(user);
    }

    /// Sign out: clears the persisted token and the in-memory state.
    ///
    /// # Errors
    /// Propagates token store failures after clearing memory.
    pub fn logout(&self) -> Result<()> {
        self.invalidate();
        self.store.clear()?;
        info!("Session cleared");
        Ok(())
    }

    /// Drop in-memory state only. Used after the transport has already
    /// wiped the persisted credential.
    pub fn invalidate(&self) {
        let mut state = self.state.write();
        state.token = None;
        state.user = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().token.is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.state.read().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    pub fn is_admin(&self) -> bool {
        self.state.read().user.as_ref().is_some_and(User::is_admin)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Session")
            .field("authenticated", &state.token.is_some())
            .field("user_id", &state.user.as_ref().map(|u| u.id))
            .finish_non_exhaustive()
    }
}
