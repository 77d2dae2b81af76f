//! Port interfaces for the assistant flow

use async_trait::async_trait;
use smartcal_domain::{ChatRequest, ChatResponse, Result};

/// Chat endpoint of the backend assistant.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Send one chat turn.
    ///
    /// Application errors surface as `SmartCalError::Application` and auth
    /// failures as `SmartCalError::Unauthenticated`, both carrying the
    /// server's message.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}

/// Signal asking the calendar view to reload its events.
pub trait EventRefresh: Send + Sync {
    fn refresh(&self);
}

impl<F> EventRefresh for F
where
    F: Fn() + Send + Sync,
{
    fn refresh(&self) {
        self()
    }
}
