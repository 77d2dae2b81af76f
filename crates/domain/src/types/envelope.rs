//! Uniform response envelope and pagination types

use serde::{Deserialize, Serialize};

use crate::constants::{is_auth_failure_code, CODE_OK};
use crate::errors::{Result, SmartCalError};

/// Envelope wrapping every API response: `{code, message, data}`.
///
/// `code == 0` signals application-level success regardless of the HTTP
/// status the response arrived with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Build a success envelope (used by tests and fakes).
    pub fn ok(data: T) -> Self {
        Self { code: CODE_OK, message: "success".to_string(), data: Some(data) }
    }

    /// Build an error envelope with no payload.
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }

    /// Whether the code is one of the session-invalidating auth codes.
    pub fn is_auth_failure(&self) -> bool {
        is_auth_failure_code(self.code)
    }

    /// Unwrap the payload, mapping non-zero codes onto domain errors.
    ///
    /// # Errors
    /// - `Unauthenticated` for 40101/40102/40301
    /// - `Application` for any other non-zero code
    /// - `Internal` when a success envelope carries no data
    pub fn into_result(self) -> Result<T> {
        if self.is_auth_failure() {
            return Err(SmartCalError::Unauthenticated { code: self.code, message: self.message });
        }
        if !self.is_ok() {
            return Err(SmartCalError::Application { code: self.code, message: self.message });
        }
        self.data.ok_or_else(|| {
            SmartCalError::Internal("success envelope carried no data".to_string())
        })
    }
}

/// One page of a listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub list: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

/// Pagination query parameters shared by listing endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page: Some(page), page_size: Some(page_size) }
    }
}
