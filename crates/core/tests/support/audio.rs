//! Fake audio device and scripted speech endpoints.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use smartcal_core::{AudioCapture, AudioInput, SpeechGateway};
use smartcal_domain::{
    AudioClip, Result as DomainResult, SmartCalError, SpeechResult, SpeechStatus, SpeechTask,
};
use tokio::time::Instant;

/// Counts device opens and releases.
#[derive(Default)]
pub struct DeviceProbe {
    opened: AtomicUsize,
    finished: AtomicUsize,
    aborted: AtomicUsize,
}

impl DeviceProbe {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Total releases through either exit of the capture.
    pub fn releases(&self) -> usize {
        self.finished.load(Ordering::SeqCst) + self.aborted()
    }
}

pub struct FakeAudioInput {
    supported: bool,
    open_error: Option<SmartCalError>,
    clip: Vec<u8>,
    pub probe: Arc<DeviceProbe>,
}

impl FakeAudioInput {
    pub fn recording(clip: &[u8]) -> Self {
        Self {
            supported: true,
            open_error: None,
            clip: clip.to_vec(),
            probe: Arc::new(DeviceProbe::default()),
        }
    }

    pub fn unsupported() -> Self {
        Self { supported: false, ..Self::recording(b"") }
    }

    pub fn failing(error: SmartCalError) -> Self {
        Self { open_error: Some(error), ..Self::recording(b"") }
    }
}

impl AudioInput for FakeAudioInput {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn open(&self) -> DomainResult<Box<dyn AudioCapture>> {
        if let Some(err) = &self.open_error {
            return Err(err.clone());
        }
        self.probe.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeCapture { clip: self.clip.clone(), probe: Arc::clone(&self.probe) }))
    }
}

struct FakeCapture {
    clip: Vec<u8>,
    probe: Arc<DeviceProbe>,
}

impl AudioCapture for FakeCapture {
    fn finish(self: Box<Self>) -> DomainResult<AudioClip> {
        self.probe.finished.fetch_add(1, Ordering::SeqCst);
        Ok(AudioClip::wav(self.clip))
    }

    fn abort(self: Box<Self>) {
        self.probe.aborted.fetch_add(1, Ordering::SeqCst);
    }
}

/// Speech endpoints returning queued poll results, then `processing`
/// forever.
pub struct ScriptedSpeech {
    submit: Mutex<Option<DomainResult<SpeechTask>>>,
    polls: Mutex<VecDeque<DomainResult<SpeechResult>>>,
    submits: AtomicUsize,
    query_times: Mutex<Vec<Instant>>,
}

impl ScriptedSpeech {
    pub fn accepting(task_id: &str) -> Self {
        Self::with_submit(Ok(SpeechTask { task_id: task_id.to_string() }))
    }

    pub fn rejecting(error: SmartCalError) -> Self {
        Self::with_submit(Err(error))
    }

    fn with_submit(submit: DomainResult<SpeechTask>) -> Self {
        Self {
            submit: Mutex::new(Some(submit)),
            polls: Mutex::new(VecDeque::new()),
            submits: AtomicUsize::new(0),
            query_times: Mutex::new(Vec::new()),
        }
    }

    pub fn then_processing(self, times: usize) -> Self {
        for _ in 0..times {
            self.polls.lock().push_back(Ok(status(SpeechStatus::Processing, None)));
        }
        self
    }

    pub fn then_done(self, text: &str) -> Self {
        self.polls.lock().push_back(Ok(status(SpeechStatus::Done, Some(text))));
        self
    }

    pub fn then(self, result: DomainResult<SpeechResult>) -> Self {
        self.polls.lock().push_back(result);
        self
    }

    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.query_times.lock().len()
    }

    pub fn query_times(&self) -> Vec<Instant> {
        self.query_times.lock().clone()
    }
}

pub fn status(status: SpeechStatus, text: Option<&str>) -> SpeechResult {
    SpeechResult { status, text: text.map(str::to_string) }
}

#[async_trait]
impl SpeechGateway for ScriptedSpeech {
    async fn submit_speech(&self, clip: AudioClip) -> DomainResult<SpeechTask> {
        assert!(!clip.is_empty(), "empty clips must never be uploaded");
        self.submits.fetch_add(1, Ordering::SeqCst);
        self.submit
            .lock()
            .take()
            .unwrap_or_else(|| Err(SmartCalError::Internal("submitted twice".to_string())))
    }

    async fn speech_result(&self, task_id: &str) -> DomainResult<SpeechResult> {
        assert_eq!(task_id, "task-1");
        self.query_times.lock().push(Instant::now());
        let next = self.polls.lock().pop_front();
        next.unwrap_or_else(|| Ok(status(SpeechStatus::Processing, None)))
    }
}
