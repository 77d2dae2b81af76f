//! Transport layer for the calendar REST API
//!
//! Every response body is decoded as the `{code, message, data}` envelope,
//! whatever its HTTP status. Auth-failure codes clear the stored token and
//! raise an [`AuthFailure`] event; other non-zero codes become
//! [`ApiError::Application`]. Bodies that are not an envelope fall back to
//! status-based errors without a server message.
//!
//! GET requests go through the retrying [`HttpClient::send`]; mutations and
//! uploads are sent exactly once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use smartcal_domain::constants::{
    is_auth_failure_code, DEFAULT_API_BASE, DEFAULT_API_TIMEOUT_SECS, DEFAULT_HTTP_MAX_ATTEMPTS,
};
use smartcal_domain::{ApiConfig, ApiEnvelope};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use super::auth::{AccessTokenProvider, AuthEvents, AuthFailure};
use super::errors::ApiError;
use crate::http::HttpClient;

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for API (e.g., "http://localhost:8080/api")
    pub base_url: String,
    /// Timeout for API requests
    pub timeout: Duration,
    /// Attempts for idempotent requests
    pub max_attempts: usize,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
        }
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_attempts: config.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Retrying,
    Once,
}

/// API client for the calendar backend
pub struct ApiClient {
    http_client: Arc<HttpClient>,
    auth: Arc<dyn AccessTokenProvider>,
    config: ApiClientConfig,
    events: AuthEvents,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be created
    pub fn new(
        config: ApiClientConfig,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .user_agent(concat!("smartcal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            http_client: Arc::new(http_client),
            auth,
            config: ApiClientConfig { base_url, ..config },
            events: AuthEvents::default(),
        })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Receive an event each time the backend rejects the session.
    pub fn subscribe_auth_failures(&self) -> broadcast::Receiver<AuthFailure> {
        self.events.subscribe()
    }

    /// Execute a GET request
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the envelope reports failure
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.http_client.request(Method::GET, self.url(path));
        self.execute(path, request, Delivery::Retrying).await
    }

    /// Execute a GET request with query parameters
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the envelope reports failure
    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http_client.request(Method::GET, self.url(path)).query(query);
        self.execute(path, request, Delivery::Retrying).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the envelope reports failure
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.http_client.request(Method::POST, self.url(path)).json(body);
        self.execute(path, request, Delivery::Once).await
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the envelope reports failure
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.http_client.request(Method::PUT, self.url(path)).json(body);
        self.execute(path, request, Delivery::Once).await
    }

    /// Execute a PUT request without a body
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the envelope reports failure
    #[instrument(skip(self), fields(path = %path))]
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.http_client.request(Method::PUT, self.url(path));
        self.execute(path, request, Delivery::Once).await
    }

    /// Execute a DELETE request
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the envelope reports failure
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.http_client.request(Method::DELETE, self.url(path));
        self.execute(path, request, Delivery::Once).await
    }

    /// Upload a multipart form
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the envelope reports failure
    #[instrument(skip(self, form), fields(path = %path))]
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let request = self.http_client.request(Method::POST, self.url(path)).multipart(form);
        self.execute(path, request, Delivery::Once).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
        delivery: Delivery,
    ) -> Result<T, ApiError> {
        let request = match self.auth.access_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let sending = async {
            match delivery {
                Delivery::Retrying => self.http_client.send(request).await,
                Delivery::Once => self.http_client.send_once(request).await,
            }
        };
        // One request timeout per attempt plus the pauses between them.
        let policy = self.http_client.policy();
        let attempts = match delivery {
            Delivery::Retrying => policy.max_attempts.max(1),
            Delivery::Once => 1,
        };
        let budget = self
            .config
            .timeout
            .saturating_mul(u32::try_from(attempts).unwrap_or(u32::MAX))
            .saturating_add(if attempts > 1 { policy.total_backoff() } else { Duration::ZERO });
        let response = match tokio::time::timeout(budget, sending).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                debug!(path = %path, kind = ?err.category(), error = %err, "Transport failure");
                return Err(err);
            }
            Err(_) => return Err(ApiError::Timeout(budget)),
        };

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response body: {}", e)))?;

        let envelope = match serde_json::from_slice::<ApiEnvelope<Value>>(&body) {
            Ok(envelope) => envelope,
            Err(err) => {
                if status.is_success() {
                    return Err(ApiError::Client(format!(
                        "Failed to parse response envelope from {}: {}",
                        path, err
                    )));
                }
                let text = String::from_utf8_lossy(&body).into_owned();
                return Err(Self::map_status_error(status, path, text));
            }
        };

        self.unwrap_envelope(path, status, envelope).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        status: StatusCode,
        envelope: ApiEnvelope<Value>,
    ) -> Result<T, ApiError> {
        let ApiEnvelope { code, message, data } = envelope;

        if is_auth_failure_code(code) {
            warn!(path = %path, code, "Session rejected by backend");
            if let Err(err) = self.auth.invalidate().await {
                warn!(error = %err, "Failed to clear rejected token");
            }
            self.events.publish(AuthFailure { code, message: message.clone() });
            return Err(ApiError::Unauthenticated { code, message });
        }

        if !envelope_ok(code) {
            debug!(path = %path, code, %status, "Backend reported application error");
            return Err(ApiError::Application { code, message });
        }

        if !status.is_success() {
            debug!(path = %path, %status, "Success envelope on error status");
            return Err(ApiError::Application { code: i64::from(status.as_u16()), message });
        }

        let data = serde_json::from_value(data.unwrap_or(Value::Null)).map_err(|e| {
            ApiError::Client(format!("Unexpected response data from {}: {}", path, e))
        })?;

        info!(path = %path, "Request successful");
        Ok(data)
    }

    fn map_status_error(status: StatusCode, path: &str, body: String) -> ApiError {
        let message = if body.is_empty() {
            format!("{} returned status {}", path, status)
        } else {
            format!("{} returned status {}: {}", path, status, body)
        };
        ApiError::from_status(status, message)
    }
}

fn envelope_ok(code: i64) -> bool {
    code == smartcal_domain::constants::CODE_OK
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the authentication provider
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or client creation fails
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let auth =
            self.auth.ok_or_else(|| ApiError::Config("Auth provider not set".to_string()))?;

        ApiClient::new(config, auth)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Provider holding an optional token and counting invalidations.
    #[derive(Default)]
    struct MockAuthProvider {
        token: Mutex<Option<String>>,
        invalidations: AtomicUsize,
    }

    impl MockAuthProvider {
        fn with_token(token: &str) -> Arc<Self> {
            Arc::new(Self { token: Mutex::new(Some(token.to_string())), ..Self::default() })
        }
    }

    #[async_trait]
    impl AccessTokenProvider for MockAuthProvider {
        async fn access_token(&self) -> Result<Option<String>, ApiError> {
            Ok(self.token.lock().clone())
        }

        async fn invalidate(&self) -> Result<(), ApiError> {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
            self.token.lock().take();
            Ok(())
        }
    }

    #[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
    struct Item {
        name: String,
    }

    fn client_for(server: &MockServer, auth: Arc<MockAuthProvider>) -> ApiClient {
        let config = ApiClientConfig {
            base_url: format!("{}/api/", server.uri()),
            timeout: Duration::from_secs(5),
            max_attempts: 2,
        };
        ApiClient::new(config, auth).unwrap()
    }

    fn envelope(code: i64, message: &str, data: Value) -> Value {
        json!({ "code": code, "message": message, "data": data })
    }

    #[tokio::test]
    async fn get_unwraps_envelope_and_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/items/1"))
            .and(header("Authorization", "Bearer jwt-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(0, "success", json!({ "name": "评审会" }))),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, MockAuthProvider::with_token("jwt-1"));
        let item: Item = client.get("/items/1").await.unwrap();

        assert_eq!(item.name, "评审会");
    }

    #[tokio::test]
    async fn signed_out_requests_carry_no_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(0, "ok", json!(null))))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MockAuthProvider::default()));
        let _: () = client.post("/auth/login", &json!({ "email": "a@b.c" })).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn application_code_on_http_200_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/events"))
            .and(body_json(json!({ "name": "x" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(40001, "时间冲突", json!(null))),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, MockAuthProvider::with_token("jwt"));
        let result: Result<Item, ApiError> =
            client.post("/events", &Item { name: "x".into() }).await;

        match result {
            Err(ApiError::Application { code, message }) => {
                assert_eq!(code, 40001);
                assert_eq!(message, "时间冲突");
            }
            other => panic!("expected application error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn auth_code_clears_token_and_publishes_event() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/profile"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(envelope(40102, "token 无效", json!(null))),
            )
            .mount(&server)
            .await;

        let auth = MockAuthProvider::with_token("expired");
        let client = client_for(&server, auth.clone());
        let mut failures = client.subscribe_auth_failures();

        let result: Result<Item, ApiError> = client.get("/user/profile").await;

        assert!(matches!(result, Err(ApiError::Unauthenticated { code: 40102, .. })));
        assert_eq!(auth.invalidations.load(Ordering::SeqCst), 1);
        assert!(auth.token.lock().is_none());
        let failure = failures.recv().await.unwrap();
        assert_eq!(failure, AuthFailure { code: 40102, message: "token 无效".into() });
    }

    #[tokio::test]
    async fn forbidden_code_on_success_status_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/users"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(40301, "无权限", json!(null))),
            )
            .mount(&server)
            .await;

        let auth = MockAuthProvider::with_token("user-token");
        let client = client_for(&server, auth.clone());
        let result: Result<Value, ApiError> = client.get("/admin/users").await;

        assert!(matches!(result, Err(ApiError::Unauthenticated { code: 40301, .. })));
        assert_eq!(auth.invalidations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_2xx_with_envelope_keeps_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/chat"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(envelope(40000, "消息不能为空", json!(null))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, MockAuthProvider::with_token("jwt"));
        let result: Result<Value, ApiError> = client.post("/ai/chat", &json!({})).await;

        let err = result.unwrap_err();
        assert_eq!(err.server_message(), Some("消息不能为空"));
    }

    #[tokio::test]
    async fn non_2xx_without_envelope_has_no_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server, MockAuthProvider::with_token("jwt"));
        let result: Result<Value, ApiError> = client.get("/events").await;

        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::Server(_)));
        assert_eq!(err.server_message(), None);
    }

    #[tokio::test]
    async fn mutations_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/events/3"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, MockAuthProvider::with_token("jwt"));
        let result: Result<Value, ApiError> = client.delete("/events/3").await;

        assert!(matches!(result, Err(ApiError::Server(_))));
    }

    #[tokio::test]
    async fn query_parameters_are_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users/search"))
            .and(query_param("keyword", "小王"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(0, "ok", json!([]))))
            .mount(&server)
            .await;

        let client = client_for(&server, MockAuthProvider::with_token("jwt"));
        let found: Vec<Item> = client
            .get_with_query("/users/search", &[("keyword", "小王"), ("page", "1")])
            .await
            .unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn malformed_success_body_is_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, MockAuthProvider::with_token("jwt"));
        let result: Result<Value, ApiError> = client.get("/events").await;

        assert!(matches!(result, Err(ApiError::Client(_))));
    }

    #[tokio::test]
    async fn test_builder_missing_auth() {
        let result = ApiClient::builder().build();
        assert!(result.is_err());
    }
}
