//! Scripted assistant gateway and a counting refresh signal.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use smartcal_core::{AssistantGateway, EventRefresh};
use smartcal_domain::{ChatRequest, ChatResponse, Result as DomainResult, SmartCalError};

struct Scripted {
    delay: Duration,
    response: DomainResult<ChatResponse>,
}

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedAssistant {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, response: ChatResponse) -> &Self {
        self.push_delayed(Duration::ZERO, Ok(response))
    }

    pub fn push_err(&self, error: SmartCalError) -> &Self {
        self.push_delayed(Duration::ZERO, Err(error))
    }

    pub fn push_delayed(&self, delay: Duration, response: DomainResult<ChatResponse>) -> &Self {
        self.script.lock().push_back(Scripted { delay, response });
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl AssistantGateway for ScriptedAssistant {
    async fn chat(&self, request: ChatRequest) -> DomainResult<ChatResponse> {
        self.requests.lock().push(request);
        let next = self.script.lock().pop_front();
        let Some(next) = next else {
            return Err(SmartCalError::Internal("no scripted response".to_string()));
        };
        if !next.delay.is_zero() {
            tokio::time::sleep(next.delay).await;
        }
        next.response
    }
}

#[derive(Default)]
pub struct CountingRefresh {
    count: AtomicUsize,
}

impl CountingRefresh {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl EventRefresh for CountingRefresh {
    fn refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
