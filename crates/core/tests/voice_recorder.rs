//! Voice capture, upload and polling behaviour.

mod support;

use std::sync::Arc;
use std::time::Duration;

use smartcal_core::{PollPolicy, VoiceOutcome, VoiceRecorder, VoiceStatus};
use smartcal_domain::{SmartCalError, SpeechStatus};
use support::audio::{status, FakeAudioInput, ScriptedSpeech};
use tokio::time::Instant;

fn recorder(input: FakeAudioInput, speech: ScriptedSpeech) -> (VoiceRecorder, Arc<FakeAudioInput>, Arc<ScriptedSpeech>) {
    let input = Arc::new(input);
    let speech = Arc::new(speech);
    let recorder = VoiceRecorder::new(input.clone(), speech.clone());
    (recorder, input, speech)
}

#[tokio::test]
async fn unsupported_platform_fails_without_touching_device() {
    let (recorder, input, _) = recorder(FakeAudioInput::unsupported(), ScriptedSpeech::accepting("task-1"));

    let state = recorder.start();

    assert_eq!(state.status, VoiceStatus::Idle);
    assert_eq!(state.error.as_deref(), Some("当前设备不支持录音"));
    assert_eq!(input.probe.opened(), 0);
}

#[tokio::test]
async fn device_open_failure_reports_device_message() {
    let (recorder, _, _) = recorder(
        FakeAudioInput::failing(SmartCalError::Audio("麦克风被占用".into())),
        ScriptedSpeech::accepting("task-1"),
    );
    assert_eq!(recorder.start().error.as_deref(), Some("麦克风被占用"));

    let (recorder, _, _) = recorder_with_open_error(SmartCalError::Internal("boom".into()));
    assert_eq!(recorder.start().error.as_deref(), Some("无法开启录音"));
}

fn recorder_with_open_error(
    error: SmartCalError,
) -> (VoiceRecorder, Arc<FakeAudioInput>, Arc<ScriptedSpeech>) {
    recorder(FakeAudioInput::failing(error), ScriptedSpeech::accepting("task-1"))
}

#[tokio::test]
async fn empty_recording_is_never_uploaded() {
    let (recorder, input, speech) = recorder(FakeAudioInput::recording(b""), ScriptedSpeech::accepting("task-1"));

    assert_eq!(recorder.start().status, VoiceStatus::Recording);
    let outcome = recorder.stop().await;

    assert_eq!(outcome, VoiceOutcome::Failed("录音为空，请重试".into()));
    assert_eq!(speech.submits(), 0);
    assert_eq!(recorder.status(), VoiceStatus::Idle);
    assert_eq!(input.probe.releases(), 1);
}

#[tokio::test(start_paused = true)]
async fn transcript_on_twentieth_poll_completes() {
    let speech = ScriptedSpeech::accepting("task-1").then_processing(19).then_done("明天下午三点开会");
    let (recorder, input, speech) = recorder(FakeAudioInput::recording(b"RIFF"), speech);

    recorder.start();
    let started = Instant::now();
    let outcome = recorder.stop().await;

    assert_eq!(outcome, VoiceOutcome::Transcript("明天下午三点开会".into()));
    assert_eq!(speech.queries(), 20);
    assert_eq!(started.elapsed(), Duration::from_secs(19));
    let state = recorder.state();
    assert_eq!(state.status, VoiceStatus::Idle);
    assert_eq!(state.transcript, "明天下午三点开会");
    assert!(state.error.is_none());
    assert_eq!(input.probe.releases(), 1);
    assert!(!recorder.is_device_held());
}

#[tokio::test(start_paused = true)]
async fn exhausting_polls_times_out_after_twenty_queries() {
    let (recorder, input, speech) =
        recorder(FakeAudioInput::recording(b"RIFF"), ScriptedSpeech::accepting("task-1"));

    recorder.start();
    let started = Instant::now();
    let outcome = recorder.stop().await;

    assert_eq!(outcome, VoiceOutcome::Failed("语音识别超时，请重试".into()));
    assert_eq!(speech.queries(), 20);
    assert_eq!(started.elapsed(), Duration::from_secs(20));
    let times = speech.query_times();
    for pair in times.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::from_secs(1));
    }
    assert_eq!(recorder.state().error.as_deref(), Some("语音识别超时，请重试"));
    assert_eq!(input.probe.releases(), 1);
}

#[tokio::test(start_paused = true)]
async fn unknown_status_keeps_polling() {
    let speech = ScriptedSpeech::accepting("task-1")
        .then(Ok(status(SpeechStatus::Unknown, None)))
        .then_done("");
    let (recorder, _, speech) = recorder(FakeAudioInput::recording(b"RIFF"), speech);

    recorder.start();
    let outcome = recorder.stop().await;

    assert_eq!(outcome, VoiceOutcome::Transcript(String::new()));
    assert_eq!(speech.queries(), 2);
}

#[tokio::test]
async fn upload_application_error_shows_server_message() {
    let (recorder, input, speech) = recorder(
        FakeAudioInput::recording(b"RIFF"),
        ScriptedSpeech::rejecting(SmartCalError::Application { code: 40010, message: "音频格式不支持".into() }),
    );

    recorder.start();
    let outcome = recorder.stop().await;

    assert_eq!(outcome, VoiceOutcome::Failed("音频格式不支持".into()));
    assert_eq!(speech.queries(), 0);
    assert_eq!(recorder.status(), VoiceStatus::Idle);
    assert_eq!(input.probe.releases(), 1);
}

#[tokio::test]
async fn upload_transport_error_falls_back() {
    let (recorder, _, _) = recorder(
        FakeAudioInput::recording(b"RIFF"),
        ScriptedSpeech::rejecting(SmartCalError::Network("connection reset".into())),
    );

    recorder.start();

    assert_eq!(recorder.stop().await, VoiceOutcome::Failed("语音识别异常".into()));
}

#[tokio::test]
async fn poll_application_error_stops_polling() {
    let speech = ScriptedSpeech::accepting("task-1")
        .then(Err(SmartCalError::Application { code: 40401, message: "任务不存在".into() }));
    let (recorder, input, speech) = recorder(FakeAudioInput::recording(b"RIFF"), speech);

    recorder.start();

    assert_eq!(recorder.stop().await, VoiceOutcome::Failed("任务不存在".into()));
    assert_eq!(speech.queries(), 1);
    assert_eq!(input.probe.releases(), 1);
}

#[tokio::test]
async fn close_while_recording_releases_device_once() {
    let (recorder, input, speech) =
        recorder(FakeAudioInput::recording(b"RIFF"), ScriptedSpeech::accepting("task-1"));

    recorder.start();
    assert!(recorder.is_device_held());
    recorder.close();

    assert_eq!(input.probe.aborted(), 1);
    assert_eq!(recorder.status(), VoiceStatus::Idle);
    assert_eq!(recorder.stop().await, VoiceOutcome::NotRecording);

    recorder.close();
    drop(recorder);
    assert_eq!(input.probe.releases(), 1);
    assert_eq!(speech.submits(), 0);
}

#[tokio::test(start_paused = true)]
async fn close_cancels_poll_loop() {
    let (recorder, input, speech) =
        recorder(FakeAudioInput::recording(b"RIFF"), ScriptedSpeech::accepting("task-1"));
    let recorder = Arc::new(recorder);

    recorder.start();
    let pending = tokio::spawn({
        let recorder = Arc::clone(&recorder);
        async move { recorder.stop().await }
    });

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    recorder.close();

    assert_eq!(pending.await.unwrap(), VoiceOutcome::Cancelled);
    let polled = speech.queries();
    assert!(polled > 0 && polled < 20, "polled {polled} times");

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(speech.queries(), polled);
    assert_eq!(recorder.status(), VoiceStatus::Idle);
    assert!(recorder.state().error.is_none());
    assert_eq!(input.probe.releases(), 1);
}

#[tokio::test]
async fn dropping_recorder_releases_device() {
    let (recorder, input, _) =
        recorder(FakeAudioInput::recording(b"RIFF"), ScriptedSpeech::accepting("task-1"));

    recorder.start();
    drop(recorder);

    assert_eq!(input.probe.releases(), 1);
}

#[tokio::test]
async fn open_clears_previous_result() {
    let (recorder, _, _) = recorder(FakeAudioInput::unsupported(), ScriptedSpeech::accepting("task-1"));
    recorder.start();
    assert!(recorder.state().error.is_some());

    recorder.open();

    let state = recorder.state();
    assert_eq!(state.status, VoiceStatus::Idle);
    assert!(state.error.is_none());
    assert!(state.transcript.is_empty());
}

#[tokio::test(start_paused = true)]
async fn custom_policy_bounds_polling() {
    let (recorder, _, speech) =
        recorder(FakeAudioInput::recording(b"RIFF"), ScriptedSpeech::accepting("task-1"));
    let recorder = recorder.with_policy(PollPolicy { interval: Duration::from_millis(250), max_polls: 3 });

    recorder.start();
    let started = Instant::now();
    recorder.stop().await;

    assert_eq!(speech.queries(), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(750));
}
