//! Voice capture, upload and transcription polling

pub mod ports;
pub mod recorder;

pub use recorder::{DeviceLease, PollPolicy, VoiceOutcome, VoiceRecorder, VoiceState, VoiceStatus};
