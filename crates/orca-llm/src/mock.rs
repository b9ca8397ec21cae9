//! Mock LLM backends for deterministic testing.
//!
//! Return pre-configured responses without making any HTTP calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use orca_core::{LlmClient, LlmRequest, LlmResponse, OrcaError, Result};

use crate::provider::*;

/// Text returned once the queue is drained.
const EXHAUSTED: &str = "(mock: no more queued responses)";

enum Queued {
    Text(String),
    Error(String),
}

fn pop(queue: &Mutex<VecDeque<Queued>>) -> Queued {
    queue
        .lock()
        .pop_front()
        .unwrap_or_else(|| Queued::Text(EXHAUSTED.to_string()))
}

/// A mock provider for exercising [`crate::ProviderRouter`].
///
/// # Example
/// ```
/// use orca_llm::mock::MockProvider;
/// let provider = MockProvider::new("test").with_response("Hello, world!");
/// ```
pub struct MockProvider {
    name: String,
    responses: Mutex<VecDeque<Queued>>,
    /// Every request received, in order.
    pub requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(VecDeque::new()),
            requests: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Queue a text response.
    pub fn with_response(self, text: &str) -> Self {
        self.responses.lock().push_back(Queued::Text(text.to_string()));
        self
    }

    /// Queue an error; the message becomes an `LlmProvider` error.
    pub fn with_error(self, error: &str) -> Self {
        self.responses.lock().push_back(Queued::Error(error.to_string()));
        self
    }

    pub fn recorded_requests(&self) -> Arc<Mutex<Vec<ChatRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().push(request.clone());
        match pop(&self.responses) {
            Queued::Text(text) => Ok(ChatResponse {
                text,
                model: request.model.clone(),
            }),
            Queued::Error(e) => Err(OrcaError::LlmProvider(e)),
        }
    }
}

/// A mock answer generator that plugs straight into the engine.
pub struct MockLlm {
    responses: Mutex<VecDeque<Queued>>,
    /// Every request received, in order.
    pub requests: Arc<Mutex<Vec<LlmRequest>>>,
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlm {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn with_response(self, text: &str) -> Self {
        self.responses.lock().push_back(Queued::Text(text.to_string()));
        self
    }

    pub fn with_error(self, error: &str) -> Self {
        self.responses.lock().push_back(Queued::Error(error.to_string()));
        self
    }

    pub fn recorded_requests(&self) -> Arc<Mutex<Vec<LlmRequest>>> {
        Arc::clone(&self.requests)
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn respond(&self, request: &LlmRequest) -> Result<LlmResponse> {
        self.requests.lock().push(request.clone());
        match pop(&self.responses) {
            Queued::Text(text) => Ok(LlmResponse {
                text,
                provider: request.provider.clone().unwrap_or_else(|| "mock".into()),
                model: request.model.clone().unwrap_or_else(|| "mock-model".into()),
            }),
            Queued::Error(e) => Err(OrcaError::LlmProvider(e)),
        }
    }
}
