//! Retrying HTTP sender for the API transport
//!
//! Failures are classified as [`ApiError`] here, and one rule decides what
//! is attempted again: [`ApiErrorCategory::is_retryable`]. A rate-limited
//! response waits for its `Retry-After` seconds when the server sends one,
//! capped at the policy's maximum backoff.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use smartcal_domain::constants::{DEFAULT_API_TIMEOUT_SECS, DEFAULT_HTTP_MAX_ATTEMPTS};
use tracing::{debug, warn};

use crate::api::{ApiError, ApiErrorCategory};

/// How many attempts an idempotent request gets and how long to pause
/// between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Pause before retry number `retry` (1-based). A server hint replaces
    /// the exponential step; both are capped at `max_backoff`.
    pub fn delay(&self, retry: usize, server_hint: Option<Duration>) -> Duration {
        let shift = u32::try_from(retry.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        let backoff = self.base_backoff.saturating_mul(1 << shift);
        server_hint.unwrap_or(backoff).min(self.max_backoff)
    }

    /// Upper bound on the time spent waiting between attempts.
    pub fn total_backoff(&self) -> Duration {
        let retries = u32::try_from(self.max_attempts.saturating_sub(1)).unwrap_or(u32::MAX);
        self.max_backoff.saturating_mul(retries)
    }
}

/// Sender shared by every API call.
///
/// [`HttpClient::send`] is for GETs; mutations and multipart uploads use
/// [`HttpClient::send_once`] so the backend never sees them twice.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Send an idempotent request, retrying transient failures.
    ///
    /// A retryable status on the final attempt comes back as a response, so
    /// the caller can still read an envelope from its body.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut retry = 0;

        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| ApiError::Config("request body cannot be replayed".into()))?
                .build()?;
            let method = request.method().clone();
            let url = request.url().clone();
            let last = retry + 1 >= attempts;

            let hint = match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    let transient = ApiErrorCategory::for_status(status)
                        .is_some_and(ApiErrorCategory::is_retryable);
                    if last || !transient {
                        debug!(%method, %url, %status, attempt = retry + 1, "HTTP response");
                        return Ok(response);
                    }
                    warn!(%method, %url, %status, attempt = retry + 1, "Transient HTTP status");
                    retry_after(&response)
                }
                Err(err) => {
                    let err = ApiError::from(err);
                    if last || !err.should_retry() {
                        debug!(%method, %url, error = %err, attempt = retry + 1, "HTTP request failed");
                        return Err(err);
                    }
                    warn!(%method, %url, error = %err, attempt = retry + 1, "Transient HTTP failure");
                    None
                }
            };

            retry += 1;
            let wait = self.policy.delay(retry, hint);
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Send the request exactly once.
    pub async fn send_once(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            ApiError::from(err)
        })?;
        debug!(%method, %url, status = %response.status(), "HTTP response (single attempt)");
        Ok(response)
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    let value = response.headers().get(RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    policy: RetryPolicy,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            policy: RetryPolicy::default(),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    /// Per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts for idempotent requests (first try included).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.policy.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.policy.base_backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.policy.max_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// # Errors
    /// Returns [`ApiError::Config`] when the TLS backend cannot be set up.
    pub fn build(self) -> Result<HttpClient, ApiError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client, policy: self.policy })
    }
}
