//! Assistant chat wire types

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::constants::CONFIRM_PHRASE;
use crate::types::de::{lenient_option, null_as_default};
use crate::types::event::EventItem;

/// Body of a chat turn.
///
/// A plain turn carries only `message`. A confirmation carries the fixed
/// confirm phrase, `confirm: true`, the token from the preceding
/// `need_confirm` answer and, when the user picked one, the target event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<i64>,
}

impl ChatRequest {
    pub fn message(message: impl Into<String>) -> Self {
        Self { message: message.into(), confirm_id: None, confirm: None, event_id: None }
    }

    pub fn confirmation(confirm_id: impl Into<String>, event_id: Option<i64>) -> Self {
        Self {
            message: CONFIRM_PHRASE.to_string(),
            confirm_id: Some(confirm_id.into()),
            confirm: Some(true),
            event_id,
        }
    }

    pub fn is_confirmation(&self) -> bool {
        self.confirm == Some(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    Success,
    NeedConfirm,
}

/// Event the assistant matched for an update or delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    pub title: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
}

/// Action the assistant intends to carry out once confirmed.
///
/// Purely informational; the backend keeps its own copy keyed by the
/// confirm id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(default)]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub participant_keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub event_id: Option<i64>,
}

/// Data of a chat turn response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub status: ChatStatus,
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Proposal>,
    /// The event the action touched, when the backend sends one that
    /// decodes. Never needed to settle the turn.
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub event: Option<EventItem>,
}

impl ChatResponse {
    /// Interpret the response as a turn outcome.
    pub fn into_outcome(self) -> ChatOutcome {
        match self.status {
            ChatStatus::Success => ChatOutcome::Completed { result: self.result, event: self.event },
            ChatStatus::NeedConfirm => ChatOutcome::NeedsConfirmation {
                result: self.result,
                confirm_id: self.confirm_id.filter(|id| !id.is_empty()),
                candidates: self.candidates,
                proposal: self.proposal,
            },
        }
    }
}

/// What a finished chat turn asks the client to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Completed {
        result: String,
        event: Option<EventItem>,
    },
    NeedsConfirmation {
        result: String,
        confirm_id: Option<String>,
        candidates: Vec<Candidate>,
        proposal: Option<Proposal>,
    },
}
