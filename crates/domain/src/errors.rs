//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for SmartCal
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum SmartCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// The backend rejected the credential (codes 40101, 40102, 40301).
    #[error("Unauthenticated ({code}): {message}")]
    Unauthenticated { code: i64, message: String },

    /// The backend answered with a non-zero application code.
    #[error("Application error ({code}): {message}")]
    Application { code: i64, message: String },

    #[error("Security error: {0}")]
    Security(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SmartCalError {
    /// Message supplied by the server, if this error carries one.
    ///
    /// Transport failures (connection refused, undecodable bodies, bare
    /// status codes) have no structured message and return `None`, which
    /// is what callers use to pick a localized fallback instead.
    pub fn structured_message(&self) -> Option<&str> {
        match self {
            Self::Application { message, .. } | Self::Unauthenticated { message, .. }
                if !message.is_empty() =>
            {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    /// Server message if present, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.structured_message().unwrap_or(fallback).to_string()
    }

    /// Stable label suitable for structured logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Auth(_) => "auth",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Application { .. } => "application",
            Self::Security(_) => "security",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Audio(_) => "audio",
            Self::Unsupported(_) => "unsupported",
            Self::Timeout(_) => "timeout",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for SmartCal operations
pub type Result<T> = std::result::Result<T, SmartCalError>;
