//! # SmartCal Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - HTTP client with retry/backoff
//! - Transport layer for the calendar REST API (bearer token, response
//!   envelope, auth-failure events) and the typed endpoint client
//! - Token stores (keychain, file, memory)
//! - Audio inputs (WAV files, optional live microphone)
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `smartcal-core`
//! - Contains all "impure" code (network, keychain, filesystem, audio)

pub mod api;
pub mod audio;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::{
    AccessTokenProvider, ApiClient, ApiClientConfig, ApiError, AuthFailure, CalendarApi,
    StoredTokenProvider,
};
pub use audio::{FileAudioInput, UnsupportedAudioInput};
#[cfg(feature = "microphone")]
pub use audio::CpalAudioInput;
pub use auth::token_store::{
    build_token_store, CachedTokenStore, FileTokenStore, KeychainTokenStore, MemoryTokenStore,
};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
