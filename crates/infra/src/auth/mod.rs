//! Credential persistence

pub mod token_store;

pub use token_store::{
    build_token_store, CachedTokenStore, FileTokenStore, KeychainTokenStore, MemoryTokenStore,
};
