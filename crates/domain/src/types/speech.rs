//! Speech recognition wire types and captured audio

use serde::{Deserialize, Serialize};

/// Handle returned when an audio clip is accepted for recognition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechTask {
    pub task_id: String,
}

/// Recognition task status. Anything other than `done` keeps the client
/// polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechStatus {
    Processing,
    Done,
    #[serde(other)]
    Unknown,
}

impl SpeechStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechResult {
    pub status: SpeechStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SpeechResult {
    /// Transcript of a finished task; empty when the backend sent none.
    pub fn transcript(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Finalized recording ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self { bytes, mime_type: mime_type.into(), file_name: file_name.into() }
    }

    /// WAV clip with the default upload file name.
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "audio/wav", "voice.wav")
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}
