//! Chat turn state machine with the two-phase confirm protocol
//!
//! A turn starts in `loading` and settles in `success`, `need_confirm` or
//! `error`. A `need_confirm` answer leaves a one-shot confirm id behind;
//! `confirm()` spends it on a follow-up turn carrying the fixed confirm
//! phrase and, when the user picked one, the target event id.
//!
//! Every dispatched turn takes a sequence number. Only the response to the
//! latest turn may touch state, so a slow answer to an earlier message
//! cannot overwrite a newer one.

use std::sync::Arc;

use parking_lot::Mutex;
use smartcal_domain::constants::AI_SERVICE_FALLBACK;
use smartcal_domain::{
    Candidate, ChatOutcome, ChatRequest, ChatResponse, Proposal, Result, SmartCalError,
};
use tracing::{debug, info, warn};

use super::ports::{AssistantGateway, EventRefresh};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TurnStatus {
    #[default]
    Idle,
    Loading,
    Success,
    NeedConfirm,
    Error,
}

/// Snapshot of the conversation as a view would render it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnState {
    pub status: TurnStatus,
    /// Draft input
    pub message: String,
    /// Assistant reply, or the error text when `status` is `Error`
    pub result: String,
    pub confirm_id: Option<String>,
    pub candidates: Vec<Candidate>,
    pub proposal: Option<Proposal>,
    pub selected_event_id: Option<i64>,
}

impl TurnState {
    pub fn requires_selection(&self) -> bool {
        self.candidates.len() > 1
    }

    pub fn can_confirm(&self) -> bool {
        self.status == TurnStatus::NeedConfirm
            && self.confirm_id.is_some()
            && (!self.requires_selection() || self.selected_event_id.is_some())
    }

    fn clear_pending(&mut self) {
        self.confirm_id = None;
        self.candidates.clear();
        self.proposal = None;
        self.selected_event_id = None;
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: TurnState,
    turn: u64,
}

/// Conversation with the backend assistant.
pub struct Conversation {
    gateway: Arc<dyn AssistantGateway>,
    refresh: Arc<dyn EventRefresh>,
    inner: Mutex<Inner>,
}

impl Conversation {
    pub fn new(gateway: Arc<dyn AssistantGateway>, refresh: Arc<dyn EventRefresh>) -> Self {
        Self { gateway, refresh, inner: Mutex::new(Inner::default()) }
    }

    pub fn state(&self) -> TurnState {
        self.inner.lock().state.clone()
    }

    pub fn status(&self) -> TurnStatus {
        self.inner.lock().state.status
    }

    pub fn message(&self) -> String {
        self.inner.lock().state.message.clone()
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.inner.lock().state.message = message.into();
    }

    pub fn requires_selection(&self) -> bool {
        self.inner.lock().state.requires_selection()
    }

    pub fn can_confirm(&self) -> bool {
        self.inner.lock().state.can_confirm()
    }

    /// Back to `idle`, dropping any pending proposal. The draft is kept.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.turn += 1;
        inner.state.status = TurnStatus::Idle;
        inner.state.result.clear();
        inner.state.clear_pending();
    }

    /// Pick the event a pending update/delete should apply to.
    ///
    /// # Errors
    /// `InvalidInput` when candidates were offered and `event_id` is not
    /// one of them.
    pub fn select_candidate(&self, event_id: i64) -> Result<()> {
        let mut inner = self.inner.lock();
        let state = &mut inner.state;
        if !state.candidates.is_empty() && !state.candidates.iter().any(|c| c.id == event_id) {
            return Err(SmartCalError::InvalidInput(format!(
                "event {event_id} is not among the proposed candidates"
            )));
        }
        state.selected_event_id = Some(event_id);
        Ok(())
    }

    pub fn clear_selection(&self) {
        self.inner.lock().state.selected_event_id = None;
    }

    /// Send the current draft.
    pub async fn send_draft(&self) -> Option<TurnStatus> {
        let draft = self.message();
        self.send(&draft).await
    }

    /// Send one utterance to the assistant.
    ///
    /// Blank input is ignored and returns `None` without a request.
    /// Otherwise returns the status once the turn settles.
    pub async fn send(&self, message: &str) -> Option<TurnStatus> {
        if message.trim().is_empty() {
            debug!("Ignoring blank assistant message");
            return None;
        }

        let turn = {
            let mut inner = self.inner.lock();
            inner.state.status = TurnStatus::Loading;
            inner.state.clear_pending();
            inner.turn += 1;
            inner.turn
        };

        debug!(turn, "Dispatching assistant turn");
        let response = self.gateway.chat(ChatRequest::message(message)).await;
        Some(self.settle(turn, response))
    }

    /// Confirm the pending proposal.
    ///
    /// No-op returning `None` unless a confirm id from an earlier
    /// `need_confirm` answer is available. The id is spent before the
    /// request leaves, so it is never sent twice.
    pub async fn confirm(&self) -> Option<TurnStatus> {
        let (turn, request) = {
            let mut inner = self.inner.lock();
            let confirm_id = inner.state.confirm_id.take()?;
            if inner.state.requires_selection() && inner.state.selected_event_id.is_none() {
                warn!(
                    candidates = inner.state.candidates.len(),
                    "Confirming without an explicit event selection"
                );
            }
            let request = ChatRequest::confirmation(confirm_id, inner.state.selected_event_id);
            inner.state.status = TurnStatus::Loading;
            inner.turn += 1;
            (inner.turn, request)
        };

        debug!(turn, event_id = ?request.event_id, "Dispatching confirmation");
        let response = self.gateway.chat(request).await;
        Some(self.settle(turn, response))
    }

    fn settle(&self, turn: u64, response: Result<ChatResponse>) -> TurnStatus {
        let (status, refresh) = {
            let mut inner = self.inner.lock();
            if inner.turn != turn {
                debug!(turn, latest = inner.turn, "Discarding stale assistant response");
                return inner.state.status;
            }
            let state = &mut inner.state;

            match response.map(ChatResponse::into_outcome) {
                Ok(ChatOutcome::Completed { result, .. }) => {
                    state.status = TurnStatus::Success;
                    state.result = result;
                    state.clear_pending();
                    (TurnStatus::Success, true)
                }
                Ok(ChatOutcome::NeedsConfirmation { result, confirm_id, candidates, proposal }) => {
                    state.status = TurnStatus::NeedConfirm;
                    state.result = result;
                    state.confirm_id = confirm_id;
                    state.candidates = candidates;
                    state.proposal = proposal;
                    state.selected_event_id = None;
                    (TurnStatus::NeedConfirm, false)
                }
                Err(err) => {
                    warn!(turn, error = %err, kind = err.label(), "Assistant turn failed");
                    state.status = TurnStatus::Error;
                    state.result = err.user_message(AI_SERVICE_FALLBACK);
                    (TurnStatus::Error, false)
                }
            }
        };

        if refresh {
            info!(turn, "Assistant action applied, refreshing events");
            self.refresh.refresh();
        }
        status
    }
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Conversation")
            .field("turn", &inner.turn)
            .field("status", &inner.state.status)
            .finish_non_exhaustive()
    }
}
