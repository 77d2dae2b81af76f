//! Transport error types
//!
//! [`ApiErrorCategory`] is what the retrying sender looks at: a category is
//! derived from an HTTP status before any body is read, and from the error
//! once one exists.

use std::time::Duration;

use reqwest::StatusCode;
use smartcal_domain::SmartCalError;
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Credential rejected (auth envelope codes, bare 401/403)
    Authentication,
    /// Non-zero envelope code
    Application,
    /// 429
    RateLimit,
    /// 5xx
    Server,
    /// Other 4xx and undecodable bodies
    Client,
    /// Connection failures, timeouts and unexpected statuses
    Network,
    Config,
}

impl ApiErrorCategory {
    /// Category of a bare HTTP status, `None` for 2xx.
    pub fn for_status(status: StatusCode) -> Option<Self> {
        if status.is_success() {
            None
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Some(Self::Authentication)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Some(Self::RateLimit)
        } else if status.is_server_error() {
            Some(Self::Server)
        } else if status.is_client_error() {
            Some(Self::Client)
        } else {
            Some(Self::Network)
        }
    }

    /// Transient failures worth another attempt of an idempotent request.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimit | Self::Server | Self::Network)
    }
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Envelope carried one of the session-invalidating codes.
    #[error("Unauthenticated ({code}): {message}")]
    Unauthenticated { code: i64, message: String },

    /// Envelope carried any other non-zero code.
    #[error("Application error ({code}): {message}")]
    Application { code: i64, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// Error for a non-2xx response that carried no envelope.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match ApiErrorCategory::for_status(status) {
            Some(ApiErrorCategory::Authentication) => Self::Auth(message),
            Some(ApiErrorCategory::RateLimit) => Self::RateLimit(message),
            Some(ApiErrorCategory::Server) => Self::Server(message),
            Some(ApiErrorCategory::Client) => Self::Client(message),
            _ => Self::Network(message),
        }
    }

    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Unauthenticated { .. } | Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::Application { .. } => ApiErrorCategory::Application,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::Client(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    pub fn should_retry(&self) -> bool {
        self.category().is_retryable()
    }

    /// Message the server put in the envelope, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated { message, .. } | Self::Application { message, .. } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Config(format!("invalid HTTP request: {err}"))
        } else if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else if let Some(status) = err.status() {
            Self::from_status(status, err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<SmartCalError> for ApiError {
    fn from(err: SmartCalError) -> Self {
        match err {
            SmartCalError::Unauthenticated { code, message } => {
                Self::Unauthenticated { code, message }
            }
            SmartCalError::Application { code, message } => Self::Application { code, message },
            SmartCalError::Network(message) => Self::Network(message),
            SmartCalError::Timeout(message) => Self::Network(message),
            SmartCalError::Auth(message) | SmartCalError::Security(message) => Self::Auth(message),
            SmartCalError::Config(message) => Self::Config(message),
            SmartCalError::NotFound(message) | SmartCalError::InvalidInput(message) => {
                Self::Client(message)
            }
            SmartCalError::Audio(message)
            | SmartCalError::Unsupported(message)
            | SmartCalError::Internal(message) => Self::Server(message),
        }
    }
}

impl From<ApiError> for SmartCalError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthenticated { code, message } => Self::Unauthenticated { code, message },
            ApiError::Application { code, message } => Self::Application { code, message },
            ApiError::Auth(message) => Self::Auth(message),
            ApiError::Config(message) => Self::Config(message),
            ApiError::Timeout(after) => Self::Timeout(format!("no response after {after:?}")),
            other @ (ApiError::RateLimit(_)
            | ApiError::Server(_)
            | ApiError::Client(_)
            | ApiError::Network(_)) => Self::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ApiError::Unauthenticated { code: 40101, message: "未登录".into() }.category(),
            ApiErrorCategory::Authentication
        );
        assert_eq!(
            ApiError::Application { code: 40001, message: "参数错误".into() }.category(),
            ApiErrorCategory::Application
        );
        assert_eq!(
            ApiError::RateLimit("test".to_string()).category(),
            ApiErrorCategory::RateLimit
        );
        assert_eq!(ApiError::Server("test".to_string()).category(), ApiErrorCategory::Server);
        assert_eq!(
            ApiError::Timeout(Duration::from_secs(15)).category(),
            ApiErrorCategory::Network
        );
    }

    #[test]
    fn test_should_retry() {
        assert!(ApiError::RateLimit("test".to_string()).should_retry());
        assert!(ApiError::Server("test".to_string()).should_retry());
        assert!(ApiError::Network("test".to_string()).should_retry());
        assert!(!ApiError::Application { code: 1, message: String::new() }.should_retry());
        assert!(!ApiError::Auth("test".to_string()).should_retry());
        assert!(!ApiError::Client("test".to_string()).should_retry());
    }

    #[test]
    fn test_status_categories() {
        assert_eq!(ApiErrorCategory::for_status(StatusCode::OK), None);
        assert_eq!(
            ApiErrorCategory::for_status(StatusCode::FORBIDDEN),
            Some(ApiErrorCategory::Authentication)
        );
        assert_eq!(
            ApiErrorCategory::for_status(StatusCode::TOO_MANY_REQUESTS),
            Some(ApiErrorCategory::RateLimit)
        );
        assert_eq!(
            ApiErrorCategory::for_status(StatusCode::BAD_GATEWAY),
            Some(ApiErrorCategory::Server)
        );
        assert_eq!(
            ApiErrorCategory::for_status(StatusCode::NOT_FOUND),
            Some(ApiErrorCategory::Client)
        );
        assert!(matches!(
            ApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "down".into()),
            ApiError::Server(msg) if msg == "down"
        ));
    }

    #[tokio::test]
    async fn test_connection_failure_is_retryable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::get(format!("http://{addr}")).await.unwrap_err();
        let mapped = ApiError::from(err);

        assert!(matches!(mapped, ApiError::Network(_)));
        assert!(mapped.should_retry());
    }

    #[test]
    fn envelope_errors_keep_server_message_across_boundary() {
        let err: SmartCalError =
            ApiError::Application { code: 40001, message: "时间冲突".into() }.into();
        assert_eq!(err.structured_message(), Some("时间冲突"));

        let err: SmartCalError = ApiError::Server("/ai/chat returned status 502".into()).into();
        assert_eq!(err.structured_message(), None);
    }
}
