//! In-memory token store with failure injection.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use smartcal_core::TokenStore;
use smartcal_domain::{Result as DomainResult, SmartCalError};

#[derive(Default)]
pub struct FakeTokenStore {
    token: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl FakeTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_string())), ..Self::default() }
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn stored(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn check_writable(&self) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SmartCalError::Security("keychain locked".to_string()));
        }
        Ok(())
    }
}

impl TokenStore for FakeTokenStore {
    fn load(&self) -> DomainResult<Option<String>> {
        Ok(self.token.lock().clone())
    }

    fn save(&self, token: &str) -> DomainResult<()> {
        self.check_writable()?;
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> DomainResult<()> {
        self.check_writable()?;
        self.token.lock().take();
        Ok(())
    }
}
