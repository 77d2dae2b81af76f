//! Audio inputs for voice capture
//!
//! Every input hands the recorder a 16-bit mono WAV clip. The microphone
//! backend needs the `microphone` feature; file input works everywhere and
//! is what the CLI and the tests use.

pub mod file;
#[cfg(feature = "microphone")]
pub mod microphone;
pub mod wav;

use smartcal_core::{AudioCapture, AudioInput};
use smartcal_domain::constants::RECORDING_UNSUPPORTED_MESSAGE;
use smartcal_domain::{Result, SmartCalError};

pub use file::FileAudioInput;
#[cfg(feature = "microphone")]
pub use microphone::CpalAudioInput;
pub use wav::{decode_wav, encode_wav, resample, to_mono};

/// Input for builds or hosts without recording support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedAudioInput;

impl AudioInput for UnsupportedAudioInput {
    fn is_supported(&self) -> bool {
        false
    }

    fn open(&self) -> Result<Box<dyn AudioCapture>> {
        Err(SmartCalError::Unsupported(RECORDING_UNSUPPORTED_MESSAGE.to_string()))
    }
}
