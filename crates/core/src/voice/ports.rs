//! Port interfaces for audio capture and speech recognition

use async_trait::async_trait;
use smartcal_domain::{AudioClip, Result, SpeechResult, SpeechTask};

/// Source of recordings (microphone, file, or nothing at all).
pub trait AudioInput: Send + Sync {
    /// Whether this platform can record at all. Checked before any device
    /// is touched.
    fn is_supported(&self) -> bool;

    /// Open the device and start capturing.
    ///
    /// # Errors
    /// `SmartCalError::Audio` with the device's message when it cannot be
    /// opened.
    fn open(&self) -> Result<Box<dyn AudioCapture>>;
}

/// An open, exclusively held capture stream.
///
/// Both methods consume the capture and release the device, so a stream
/// can only ever be released once.
pub trait AudioCapture: Send {
    /// Stop capturing and return the encoded clip.
    ///
    /// # Errors
    /// `SmartCalError::Audio` when the captured samples cannot be encoded.
    fn finish(self: Box<Self>) -> Result<AudioClip>;

    /// Stop capturing and discard everything recorded.
    fn abort(self: Box<Self>);
}

/// Asynchronous speech recognition endpoints.
#[async_trait]
pub trait SpeechGateway: Send + Sync {
    /// Upload a clip and receive the recognition task handle.
    async fn submit_speech(&self, clip: AudioClip) -> Result<SpeechTask>;

    /// Query the current state of a recognition task.
    async fn speech_result(&self, task_id: &str) -> Result<SpeechResult>;
}
