//! Calendar backend client
//!
//! Envelope-aware transport ([`ApiClient`]), the token seam it authenticates
//! with, and typed endpoints ([`CalendarApi`]).

pub mod auth;
pub mod client;
pub mod commands;
pub mod errors;

pub use auth::{AccessTokenProvider, AuthEvents, AuthFailure, StoredTokenProvider};
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use commands::CalendarApi;
pub use errors::{ApiError, ApiErrorCategory};
