//! In-process model that replays queued replies, used by the test suites.

use super::provider::{AiError, GenerativeModel};
use super::types::{GenerationRequest, GenerationResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// A model that answers requests from a FIFO queue of scripted replies and
/// records every request it receives.
///
/// When a gate is installed, every call waits for a permit before replying.
/// Tests use this to observe in-flight state.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<GenerationResponse, AiError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every call until a permit is added to `gate`.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn push_text(&self, text: impl Into<String>) -> &Self {
        self.push(Ok(GenerationResponse::from_text(text)))
    }

    pub fn push_error(&self, error: AiError) -> &Self {
        self.push(Err(error))
    }

    pub fn push(&self, reply: Result<GenerationResponse, AiError>) -> &Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, AiError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| AiError::Connection(e.to_string()))?;
            permit.forget();
        }

        let next = self
            .replies
            .lock()
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?
            .pop_front();
        next.unwrap_or_else(|| {
            Err(AiError::InvalidResponse(
                "No scripted reply left".to_string(),
            ))
        })
    }
}
