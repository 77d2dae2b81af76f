//! Application context - dependency injection container
//!
//! Wires configuration, the token store, the transport, the typed API,
//! the session and the assistant input together, and listens for
//! auth-failure events from the transport.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use smartcal_core::{
    AiInput, AudioInput, Conversation, EventRefresh, PollPolicy, Session, TokenStore,
    VoiceRecorder,
};
use smartcal_domain::{Config, Result, SmartCalError, VoiceConfig};
use smartcal_infra::api::StoredTokenProvider;
use smartcal_infra::{build_token_store, config, ApiClient, ApiClientConfig, CalendarApi};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub api: Arc<CalendarApi>,
    pub session: Arc<Session>,
    pub ai_input: Arc<AiInput>,
    login_required: Arc<AtomicBool>,
    calendar_revision: Arc<AtomicU64>,
    auth_watcher: JoinHandle<()>,
}

impl AppContext {
    /// Create a context from the configuration found by
    /// [`smartcal_infra::config::load`].
    ///
    /// # Errors
    /// Returns configuration, token store or transport construction errors.
    pub async fn new() -> Result<Self> {
        let config = config::load()?;
        Self::new_with_config(config).await
    }

    /// Create a context with the token store selected by `config`.
    ///
    /// # Errors
    /// Returns token store or transport construction errors.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        Self::builder(config).build().await
    }

    pub fn builder(config: Config) -> AppContextBuilder {
        AppContextBuilder { config, token_store: None, audio_input: None }
    }

    /// True once the backend has rejected the session; cleared by the next
    /// successful sign-in.
    pub fn login_required(&self) -> bool {
        self.login_required.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_login_required(&self) {
        self.session.invalidate();
        self.login_required.store(true, Ordering::SeqCst);
    }

    pub(crate) fn clear_login_required(&self) {
        self.login_required.store(false, Ordering::SeqCst);
    }

    /// Incremented each time the assistant changed the calendar.
    pub fn calendar_revision(&self) -> u64 {
        self.calendar_revision.load(Ordering::SeqCst)
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.auth_watcher.abort();
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("base_url", &self.config.api.base_url)
            .field("session", &self.session)
            .field("login_required", &self.login_required())
            .finish_non_exhaustive()
    }
}

/// Builder for [`AppContext`]; tests and the CLI swap the token store or
/// the audio source here.
pub struct AppContextBuilder {
    config: Config,
    token_store: Option<Arc<dyn TokenStore>>,
    audio_input: Option<Arc<dyn AudioInput>>,
}

impl AppContextBuilder {
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn audio_input(mut self, input: Arc<dyn AudioInput>) -> Self {
        self.audio_input = Some(input);
        self
    }

    /// Build the context. Must run inside a tokio runtime.
    ///
    /// # Errors
    /// Returns token store or transport construction errors.
    pub async fn build(self) -> Result<AppContext> {
        let Self { config, token_store, audio_input } = self;

        let store = match token_store {
            Some(store) => store,
            None => build_token_store(&config.auth)?,
        };

        let session = Arc::new(Session::new(store.clone()));
        session.init()?;

        let client = ApiClient::new(
            ApiClientConfig::from(&config.api),
            Arc::new(StoredTokenProvider::new(store)),
        )
        .map_err(SmartCalError::from)?;
        let auth_failures = client.subscribe_auth_failures();
        let api = Arc::new(CalendarApi::new(Arc::new(client)));

        let calendar_revision = Arc::new(AtomicU64::new(0));
        let revision = calendar_revision.clone();
        let refresh: Arc<dyn EventRefresh> = Arc::new(move || {
            revision.fetch_add(1, Ordering::SeqCst);
        });

        let conversation = Arc::new(Conversation::new(api.clone(), refresh));
        let audio = audio_input.unwrap_or_else(|| default_audio_input(&config.voice));
        let voice =
            VoiceRecorder::new(audio, api.clone()).with_policy(PollPolicy::from(&config.voice));
        let ai_input = Arc::new(AiInput::new(conversation, voice));

        let login_required = Arc::new(AtomicBool::new(false));
        let auth_watcher =
            spawn_auth_watcher(auth_failures, session.clone(), login_required.clone());

        info!(
            base_url = %config.api.base_url,
            signed_in = session.is_authenticated(),
            "Application context ready"
        );

        Ok(AppContext {
            config,
            api,
            session,
            ai_input,
            login_required,
            calendar_revision,
            auth_watcher,
        })
    }
}

fn spawn_auth_watcher(
    mut failures: tokio::sync::broadcast::Receiver<smartcal_infra::AuthFailure>,
    session: Arc<Session>,
    login_required: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match failures.recv().await {
                Ok(failure) => {
                    warn!(code = failure.code, "Session rejected, sign-in required");
                    session.invalidate();
                    login_required.store(true, Ordering::SeqCst);
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Auth failure events lagged");
                    session.invalidate();
                    login_required.store(true, Ordering::SeqCst);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(feature = "microphone")]
fn default_audio_input(voice: &VoiceConfig) -> Arc<dyn AudioInput> {
    Arc::new(smartcal_infra::CpalAudioInput::new(voice))
}

#[cfg(not(feature = "microphone"))]
fn default_audio_input(_voice: &VoiceConfig) -> Arc<dyn AudioInput> {
    Arc::new(smartcal_infra::UnsupportedAudioInput)
}
