//! Assistant input: the conversation plus its voice capture panel

use std::sync::Arc;

use tracing::debug;

use super::conversation::{Conversation, TurnStatus};
use crate::voice::{VoiceOutcome, VoiceRecorder, VoiceState};

/// Text and voice entry point to the assistant.
///
/// A finished voice session with a non-empty transcript replaces the
/// conversation draft; nothing is sent until the user asks for it.
#[derive(Debug)]
pub struct AiInput {
    conversation: Arc<Conversation>,
    voice: VoiceRecorder,
}

impl AiInput {
    pub fn new(conversation: Arc<Conversation>, voice: VoiceRecorder) -> Self {
        Self { conversation, voice }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn voice(&self) -> &VoiceRecorder {
        &self.voice
    }

    pub fn open_voice(&self) {
        self.voice.open();
    }

    pub fn start_voice(&self) -> VoiceState {
        self.voice.start()
    }

    /// Stop recording and wait for the transcript, copying it into the
    /// draft when it is non-empty.
    pub async fn stop_voice(&self) -> VoiceOutcome {
        let outcome = self.voice.stop().await;
        if let VoiceOutcome::Transcript(text) = &outcome {
            if text.is_empty() {
                debug!("Empty transcript, draft left unchanged");
            } else {
                self.conversation.set_message(text.clone());
            }
        }
        outcome
    }

    pub fn close_voice(&self) {
        self.voice.close();
    }

    pub async fn send(&self) -> Option<TurnStatus> {
        self.conversation.send_draft().await
    }

    pub async fn confirm(&self) -> Option<TurnStatus> {
        self.conversation.confirm().await
    }
}
