//! Recording source backed by an audio file on disk

use std::fs;
use std::path::{Path, PathBuf};

use smartcal_core::{AudioCapture, AudioInput};
use smartcal_domain::constants::SPEECH_SAMPLE_RATE;
use smartcal_domain::{AudioClip, Result, SmartCalError};
use tracing::{debug, info};

use super::wav::{decode_wav, encode_wav, resample};

/// Plays back a pre-recorded file as if it had been captured live.
///
/// WAV files are normalized to 16 kHz mono so the backend sees the same
/// format the microphone produces; other containers are uploaded as-is.
#[derive(Debug, Clone)]
pub struct FileAudioInput {
    path: PathBuf,
    sample_rate: u32,
}

impl FileAudioInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), sample_rate: SPEECH_SAMPLE_RATE }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioInput for FileAudioInput {
    fn is_supported(&self) -> bool {
        true
    }

    fn open(&self) -> Result<Box<dyn AudioCapture>> {
        let bytes = fs::read(&self.path).map_err(|e| {
            SmartCalError::Audio(format!("cannot open {}: {}", self.path.display(), e))
        })?;
        info!(path = %self.path.display(), bytes = bytes.len(), "Audio file opened");

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "voice".to_string());

        Ok(Box::new(FileCapture {
            bytes,
            mime_type: mime_for(&self.path),
            file_name,
            sample_rate: self.sample_rate,
        }))
    }
}

struct FileCapture {
    bytes: Vec<u8>,
    mime_type: &'static str,
    file_name: String,
    sample_rate: u32,
}

impl AudioCapture for FileCapture {
    fn finish(self: Box<Self>) -> Result<AudioClip> {
        if self.mime_type != "audio/wav" || self.bytes.is_empty() {
            return Ok(AudioClip::new(self.bytes, self.mime_type, self.file_name));
        }

        let (samples, rate) = decode_wav(&self.bytes)?;
        if samples.is_empty() {
            debug!("WAV file holds no samples");
            return Ok(AudioClip::wav(Vec::new()));
        }
        let samples = resample(&samples, rate, self.sample_rate);
        Ok(AudioClip::wav(encode_wav(&samples, self.sample_rate)?))
    }

    fn abort(self: Box<Self>) {
        debug!(file = %self.file_name, "File capture discarded");
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("webm") => "audio/webm",
        Some("ogg" | "oga") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("m4a" | "mp4") => "audio/mp4",
        _ => "application/octet-stream",
    }
}
