//! Shared fixtures for application integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use smartcal_core::{AudioInput, TokenStore};
use smartcal_domain::{Config, TokenBackend};
use smartcal_infra::MemoryTokenStore;
use smartcal_lib::AppContext;
use wiremock::{MockServer, ResponseTemplate};

/// Context wired to `server` with an in-memory token store.
pub async fn context_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> AppContext {
    builder_for(server, store).build().await.expect("failed to build test context")
}

pub fn builder_for(
    server: &MockServer,
    store: Arc<MemoryTokenStore>,
) -> smartcal_lib::AppContextBuilder {
    AppContext::builder(test_config(server)).token_store(store as Arc<dyn TokenStore>)
}

pub async fn context_with_audio(
    server: &MockServer,
    store: Arc<MemoryTokenStore>,
    audio: Arc<dyn AudioInput>,
) -> AppContext {
    builder_for(server, store).audio_input(audio).build().await.expect("failed to build test context")
}

pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = format!("{}/api", server.uri());
    config.api.timeout_secs = 5;
    config.api.max_attempts = 1;
    config.auth.token_backend = TokenBackend::Memory;
    config.voice.poll_interval_ms = 10;
    config
}

pub fn signed_in_store(token: &str) -> Arc<MemoryTokenStore> {
    let store = Arc::new(MemoryTokenStore::new());
    store.save(token).expect("memory store never fails");
    store
}

pub fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "message": "success", "data": data }))
}

pub fn fail(status: u16, code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "code": code, "message": message, "data": null }))
}

pub fn user_json(id: i64, role: &str) -> Value {
    json!({
        "id": id,
        "nickname": "小陈",
        "email": "chen@example.com",
        "avatar": null,
        "role": role,
        "status": "active",
        "created_at": "2026-04-01T09:00:00+08:00",
        "updated_at": "2026-04-01T09:00:00+08:00"
    })
}

pub fn event_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "user_id": 1,
        "title": title,
        "type": "work",
        "start_time": "2026-05-07T15:00:00+08:00",
        "end_time": "2026-05-07T16:00:00+08:00",
        "location": null,
        "description": null,
        "created_at": "2026-05-01T09:00:00+08:00",
        "updated_at": "2026-05-01T09:00:00+08:00",
        "is_creator": true,
        "is_collaboration": false
    })
}

/// Write a short 16 kHz mono WAV file with a tone.
pub fn write_tone(path: &Path, samples: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for i in 0..samples {
        let v = ((i as f32 / 8.0).sin() * 8_000.0) as i16;
        writer.write_sample(v).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}
