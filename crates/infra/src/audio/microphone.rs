//! Microphone capture using cpal
//!
//! cpal streams are not `Send`, so each recording owns a dedicated thread
//! that builds the stream, keeps it alive until told to stop, and drops it
//! there. Samples are converted to mono and resampled to the speech rate
//! when the recording finishes.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use parking_lot::Mutex;
use smartcal_core::{AudioCapture, AudioInput};
use smartcal_domain::{AudioClip, Result, SmartCalError, VoiceConfig};
use tracing::{debug, error, info, warn};

use super::wav::{encode_wav, resample, to_mono};

/// Live microphone input
#[derive(Debug, Clone)]
pub struct CpalAudioInput {
    device_name: Option<String>,
    target_sample_rate: u32,
}

impl CpalAudioInput {
    pub fn new(config: &VoiceConfig) -> Self {
        Self { device_name: config.input_device.clone(), target_sample_rate: config.sample_rate }
    }

    /// List available input devices.
    ///
    /// # Errors
    ///
    /// Returns an error if devices cannot be enumerated.
    pub fn list_input_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| SmartCalError::Audio(format!("cannot enumerate devices: {e}")))?;

        Ok(devices.filter_map(|d| d.description().ok().map(|desc| desc.name().to_owned())).collect())
    }

    fn device(&self) -> Result<cpal::Device> {
        let host = cpal::default_host();
        match &self.device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| SmartCalError::Audio(format!("cannot enumerate devices: {e}")))?
                .find(|d| d.description().ok().is_some_and(|desc| desc.name() == name))
                .ok_or_else(|| SmartCalError::Audio(format!("input device '{name}' not found"))),
            None => host
                .default_input_device()
                .ok_or_else(|| SmartCalError::Audio("no default input device".into())),
        }
    }
}

impl AudioInput for CpalAudioInput {
    fn is_supported(&self) -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    fn open(&self) -> Result<Box<dyn AudioCapture>> {
        let device = self.device()?;
        let samples = Arc::new(Mutex::new(Vec::new()));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(u32, u16)>>(1);

        let sink = samples.clone();
        let worker = thread::Builder::new()
            .name("smartcal-capture".into())
            .spawn(move || run_stream(device, sink, ready_tx, stop_rx))
            .map_err(|e| SmartCalError::Audio(format!("cannot start capture thread: {e}")))?;

        let (native_rate, channels) = ready_rx
            .recv()
            .map_err(|_| SmartCalError::Audio("capture thread exited early".into()))??;

        Ok(Box::new(CpalCapture {
            samples,
            stop: Some(stop_tx),
            worker: Some(worker),
            native_rate,
            channels,
            target_rate: self.target_sample_rate,
        }))
    }
}

fn run_stream(
    device: cpal::Device,
    sink: Arc<Mutex<Vec<f32>>>,
    ready: mpsc::SyncSender<Result<(u32, u16)>>,
    stop: mpsc::Receiver<()>,
) {
    let started = (|| -> Result<(cpal::Stream, u32, u16)> {
        let default_config = device
            .default_input_config()
            .map_err(|e| SmartCalError::Audio(format!("no default input config: {e}")))?;
        let stream_config = StreamConfig {
            channels: default_config.channels(),
            sample_rate: default_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                    sink.lock().extend_from_slice(data);
                },
                move |err| {
                    error!("audio input stream error: {err}");
                },
                None,
            )
            .map_err(|e| SmartCalError::Audio(format!("failed to build input stream: {e}")))?;
        stream
            .play()
            .map_err(|e| SmartCalError::Audio(format!("failed to start input stream: {e}")))?;

        Ok((stream, stream_config.sample_rate, stream_config.channels))
    })();

    match started {
        Ok((stream, rate, channels)) => {
            info!(rate, channels, "Microphone capture started");
            if ready.send(Ok((rate, channels))).is_err() {
                return;
            }
            // Either an explicit stop or the capture being dropped ends it.
            let _ = stop.recv();
            drop(stream);
            info!("Microphone capture stopped");
        }
        Err(err) => {
            let _ = ready.send(Err(err));
        }
    }
}

struct CpalCapture {
    samples: Arc<Mutex<Vec<f32>>>,
    stop: Option<mpsc::Sender<()>>,
    worker: Option<JoinHandle<()>>,
    native_rate: u32,
    channels: u16,
    target_rate: u32,
}

impl CpalCapture {
    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("capture thread panicked");
            }
        }
    }
}

impl AudioCapture for CpalCapture {
    fn finish(mut self: Box<Self>) -> Result<AudioClip> {
        self.shutdown();
        let raw = std::mem::take(&mut *self.samples.lock());
        debug!(samples = raw.len(), "Recording finished");
        if raw.is_empty() {
            return Ok(AudioClip::wav(Vec::new()));
        }

        let mono = to_mono(&raw, self.channels);
        let samples = resample(&mono, self.native_rate, self.target_rate);
        Ok(AudioClip::wav(encode_wav(&samples, self.target_rate)?))
    }

    fn abort(mut self: Box<Self>) {
        self.shutdown();
        self.samples.lock().clear();
        debug!("Recording discarded");
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        self.shutdown();
    }
}
