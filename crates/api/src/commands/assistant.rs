//! Assistant commands: chat turns, confirmation and voice input

use smartcal_core::{TurnState, TurnStatus, VoiceOutcome, VoiceState, VoiceStatus};
use smartcal_domain::{EventItem, EventListQuery, Result as DomainResult};
use tracing::{debug, warn};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Conversation state after a turn, plus the reloaded calendar when the
/// turn changed it.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub state: TurnState,
    /// `true` when nothing was sent: blank input, or a confirmation with
    /// no confirm id left
    pub ignored: bool,
    pub events: Option<Vec<EventItem>>,
}

/// What the user can do after a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// The turn is settled, or the backend asked for a confirmation it
    /// gave no confirm id for
    Done,
    /// Several candidates matched and none is selected yet
    SelectCandidate,
    Confirm,
}

impl AssistantReply {
    pub fn next_step(&self) -> NextStep {
        let state = &self.state;
        if state.status != TurnStatus::NeedConfirm || state.confirm_id.is_none() {
            NextStep::Done
        } else if state.requires_selection() && state.selected_event_id.is_none() {
            NextStep::SelectCandidate
        } else {
            NextStep::Confirm
        }
    }
}

/// Send `message` as a new turn.
pub async fn ask(ctx: &AppContext, message: &str) -> DomainResult<AssistantReply> {
    execute_command(ctx, "assistant::ask", || async {
        let revision = ctx.calendar_revision();
        let status = ctx.ai_input.conversation().send(message).await;
        Ok(reply(ctx, revision, status.is_none()).await)
    })
    .await
}

/// Pick the target event among several candidates.
pub async fn select_candidate(ctx: &AppContext, event_id: i64) -> DomainResult<TurnState> {
    execute_command(ctx, "assistant::select_candidate", || async {
        let conversation = ctx.ai_input.conversation();
        conversation.select_candidate(event_id)?;
        Ok(conversation.state())
    })
    .await
}

/// Confirm the pending proposal.
pub async fn confirm(ctx: &AppContext) -> DomainResult<AssistantReply> {
    execute_command(ctx, "assistant::confirm", || async {
        let revision = ctx.calendar_revision();
        let status = ctx.ai_input.confirm().await;
        Ok(reply(ctx, revision, status.is_none()).await)
    })
    .await
}

pub fn start_voice(ctx: &AppContext) -> VoiceState {
    ctx.ai_input.open_voice();
    ctx.ai_input.start_voice()
}

pub async fn stop_voice(ctx: &AppContext) -> DomainResult<VoiceOutcome> {
    execute_command(ctx, "assistant::stop_voice", || async { Ok(ctx.ai_input.stop_voice().await) })
        .await
}

/// Record from the configured input and wait for the transcript.
///
/// With a file input the recording is the whole file; a successful
/// transcript becomes the conversation draft.
pub async fn transcribe_voice(ctx: &AppContext) -> DomainResult<VoiceOutcome> {
    let state = start_voice(ctx);
    if state.status != VoiceStatus::Recording {
        let message = state.error.unwrap_or_default();
        debug!(%message, "Recording did not start");
        ctx.ai_input.close_voice();
        return Ok(VoiceOutcome::Failed(message));
    }
    stop_voice(ctx).await
}

async fn reply(ctx: &AppContext, revision: u64, ignored: bool) -> AssistantReply {
    let state = ctx.ai_input.conversation().state();
    let events = if ctx.calendar_revision() == revision {
        None
    } else {
        match ctx.api.list_events(&EventListQuery::default()).await {
            Ok(events) => Some(events),
            Err(err) => {
                warn!(error = %err, "Failed to reload calendar after assistant change");
                None
            }
        }
    };
    AssistantReply { state, ignored, events }
}
