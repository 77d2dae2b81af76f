//! Voice recorder state machine
//!
//! `idle -> recording -> uploading -> processing -> idle`, ending with either
//! a transcript or an error message. The capture device is held through a
//! [`DeviceLease`] from `start()` until the clip is finalized, and is
//! released on every path back to idle: stop, failure, timeout, `close()`
//! and drop.
//!
//! Each recording gets a session number and a cancellation token. `close()`
//! cancels the token and bumps the session, so an upload or poll loop still
//! in flight returns [`VoiceOutcome::Cancelled`] without touching state.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use smartcal_domain::constants::{
    RECORDING_EMPTY_MESSAGE, RECORDING_OPEN_FAILED_MESSAGE, RECORDING_UNSUPPORTED_MESSAGE,
    SPEECH_FALLBACK, SPEECH_MAX_POLLS, SPEECH_POLL_INTERVAL_MS, SPEECH_TIMEOUT_MESSAGE,
};
use smartcal_domain::{AudioClip, Result, SmartCalError, VoiceConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ports::{AudioCapture, AudioInput, SpeechGateway};

/// How often and how long to poll a recognition task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause after each poll that did not finish the task
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { interval: Duration::from_millis(SPEECH_POLL_INTERVAL_MS), max_polls: SPEECH_MAX_POLLS }
    }
}

impl From<&VoiceConfig> for PollPolicy {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoiceStatus {
    #[default]
    Idle,
    Recording,
    Uploading,
    Processing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceState {
    pub status: VoiceStatus,
    pub transcript: String,
    pub error: Option<String>,
}

/// Result of finishing a recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    /// Recognition finished; the text may be empty
    Transcript(String),
    Failed(String),
    /// The recorder was closed while the clip was in flight
    Cancelled,
    /// `stop()` was called without an active recording
    NotRecording,
}

/// Exclusive hold on an open capture stream.
///
/// The stream is released exactly once: by [`DeviceLease::finish`],
/// [`DeviceLease::release`], or on drop, whichever comes first.
pub struct DeviceLease {
    capture: Option<Box<dyn AudioCapture>>,
}

impl DeviceLease {
    pub fn new(capture: Box<dyn AudioCapture>) -> Self {
        Self { capture: Some(capture) }
    }

    pub fn is_held(&self) -> bool {
        self.capture.is_some()
    }

    /// Stop capturing and hand back the clip.
    ///
    /// # Errors
    /// Propagates the capture's encoding error.
    pub fn finish(mut self) -> Result<AudioClip> {
        match self.capture.take() {
            Some(capture) => capture.finish(),
            None => Err(SmartCalError::Internal("audio device already released".to_string())),
        }
    }

    pub fn release(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(capture) = self.capture.take() {
            debug!("Releasing audio device");
            capture.abort();
        }
    }
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        self.abort();
    }
}

impl std::fmt::Debug for DeviceLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLease").field("held", &self.is_held()).finish()
    }
}

struct Inner {
    state: VoiceState,
    lease: Option<DeviceLease>,
    cancel: CancellationToken,
    session: u64,
}

/// Records a clip, uploads it and polls until a transcript is ready.
pub struct VoiceRecorder {
    input: Arc<dyn AudioInput>,
    gateway: Arc<dyn SpeechGateway>,
    policy: PollPolicy,
    inner: Mutex<Inner>,
}

impl VoiceRecorder {
    pub fn new(input: Arc<dyn AudioInput>, gateway: Arc<dyn SpeechGateway>) -> Self {
        Self {
            input,
            gateway,
            policy: PollPolicy::default(),
            inner: Mutex::new(Inner {
                state: VoiceState::default(),
                lease: None,
                cancel: CancellationToken::new(),
                session: 0,
            }),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn state(&self) -> VoiceState {
        self.inner.lock().state.clone()
    }

    pub fn status(&self) -> VoiceStatus {
        self.inner.lock().state.status
    }

    pub fn is_device_held(&self) -> bool {
        self.inner.lock().lease.as_ref().is_some_and(DeviceLease::is_held)
    }

    /// Prepare for a fresh recording: cancels anything in flight and clears
    /// the previous transcript and error.
    pub fn open(&self) {
        let lease = {
            let mut inner = self.inner.lock();
            let lease = Self::interrupt(&mut inner);
            inner.state = VoiceState::default();
            lease
        };
        drop(lease);
    }

    /// Start recording.
    ///
    /// Reports an error state instead of failing when the platform cannot
    /// record or the device cannot be opened. Ignored unless idle.
    pub fn start(&self) -> VoiceState {
        let mut inner = self.inner.lock();
        if inner.state.status != VoiceStatus::Idle {
            debug!(status = ?inner.state.status, "Recorder busy, ignoring start");
            return inner.state.clone();
        }
        inner.state.transcript.clear();
        inner.state.error = None;

        if !self.input.is_supported() {
            warn!("Audio capture is not supported on this platform");
            inner.state.error = Some(RECORDING_UNSUPPORTED_MESSAGE.to_string());
            return inner.state.clone();
        }

        match self.input.open() {
            Ok(capture) => {
                inner.session += 1;
                inner.cancel = CancellationToken::new();
                inner.lease = Some(DeviceLease::new(capture));
                inner.state.status = VoiceStatus::Recording;
                info!(session = inner.session, "Recording started");
            }
            Err(err) => {
                warn!(error = %err, "Failed to open audio input");
                inner.state.error = Some(device_message(&err));
            }
        }
        inner.state.clone()
    }

    /// Finish recording, upload the clip and wait for the transcript.
    pub async fn stop(&self) -> VoiceOutcome {
        let (lease, session, cancel) = {
            let mut inner = self.inner.lock();
            if inner.state.status != VoiceStatus::Recording {
                return VoiceOutcome::NotRecording;
            }
            let Some(lease) = inner.lease.take() else {
                inner.state.status = VoiceStatus::Idle;
                return VoiceOutcome::NotRecording;
            };
            (lease, inner.session, inner.cancel.clone())
        };

        let clip = match lease.finish() {
            Ok(clip) => clip,
            Err(err) => {
                warn!(error = %err, "Failed to finalize recording");
                return self.fail(session, device_message(&err));
            }
        };
        if clip.is_empty() {
            return self.fail(session, RECORDING_EMPTY_MESSAGE.to_string());
        }

        if !self.advance(session, VoiceStatus::Uploading) {
            return VoiceOutcome::Cancelled;
        }
        debug!(session, bytes = clip.len(), "Uploading recording");
        let submitted = tokio::select! {
            () = cancel.cancelled() => return VoiceOutcome::Cancelled,
            submitted = self.gateway.submit_speech(clip) => submitted,
        };
        let task = match submitted {
            Ok(task) => task,
            Err(err) => {
                warn!(error = %err, kind = err.label(), "Speech upload failed");
                return self.fail(session, err.user_message(SPEECH_FALLBACK));
            }
        };

        if !self.advance(session, VoiceStatus::Processing) {
            return VoiceOutcome::Cancelled;
        }
        self.poll(session, &cancel, &task.task_id).await
    }

    /// Abandon the current recording or transcription and release the
    /// device.
    pub fn close(&self) {
        let lease = {
            let mut inner = self.inner.lock();
            Self::interrupt(&mut inner)
        };
        drop(lease);
    }

    async fn poll(&self, session: u64, cancel: &CancellationToken, task_id: &str) -> VoiceOutcome {
        for attempt in 1..=self.policy.max_polls {
            let polled = tokio::select! {
                () = cancel.cancelled() => return VoiceOutcome::Cancelled,
                polled = self.gateway.speech_result(task_id) => polled,
            };

            match polled {
                Ok(result) if result.status.is_terminal() => {
                    info!(session, attempt, "Speech recognition finished");
                    return self.complete(session, result.transcript().to_string());
                }
                Ok(result) => {
                    debug!(session, attempt, status = ?result.status, "Speech task pending");
                }
                Err(err) => {
                    warn!(session, attempt, error = %err, "Speech query failed");
                    return self.fail(session, err.user_message(SPEECH_FALLBACK));
                }
            }

            tokio::select! {
                () = cancel.cancelled() => return VoiceOutcome::Cancelled,
                () = tokio::time::sleep(self.policy.interval) => {}
            }
        }

        warn!(session, max_polls = self.policy.max_polls, "Speech recognition timed out");
        self.fail(session, SPEECH_TIMEOUT_MESSAGE.to_string())
    }

    fn advance(&self, session: u64, status: VoiceStatus) -> bool {
        let mut inner = self.inner.lock();
        if inner.session != session {
            return false;
        }
        inner.state.status = status;
        true
    }

    fn complete(&self, session: u64, transcript: String) -> VoiceOutcome {
        let settled = self.settle(session, |state| {
            state.transcript.clone_from(&transcript);
            state.error = None;
        });
        if settled {
            VoiceOutcome::Transcript(transcript)
        } else {
            VoiceOutcome::Cancelled
        }
    }

    fn fail(&self, session: u64, message: String) -> VoiceOutcome {
        let settled = self.settle(session, |state| state.error = Some(message.clone()));
        if settled {
            VoiceOutcome::Failed(message)
        } else {
            VoiceOutcome::Cancelled
        }
    }

    /// Return to idle if `session` is still current, releasing the device.
    fn settle(&self, session: u64, apply: impl FnOnce(&mut VoiceState)) -> bool {
        let lease = {
            let mut inner = self.inner.lock();
            if inner.session != session {
                return false;
            }
            inner.state.status = VoiceStatus::Idle;
            apply(&mut inner.state);
            inner.lease.take()
        };
        drop(lease);
        true
    }

    fn interrupt(inner: &mut Inner) -> Option<DeviceLease> {
        inner.cancel.cancel();
        inner.session += 1;
        inner.state.status = VoiceStatus::Idle;
        inner.lease.take()
    }
}

impl Drop for VoiceRecorder {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        inner.cancel.cancel();
        inner.lease.take();
    }
}

impl std::fmt::Debug for VoiceRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceRecorder")
            .field("state", &self.state())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn device_message(err: &SmartCalError) -> String {
    match err {
        SmartCalError::Audio(message) | SmartCalError::Unsupported(message)
            if !message.is_empty() =>
        {
            message.clone()
        }
        _ => RECORDING_OPEN_FAILED_MESSAGE.to_string(),
    }
}
