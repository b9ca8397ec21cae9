use serde::{Deserialize, Serialize};

use crate::message::HistoryMessage;
use crate::tool::Observation;
use crate::trace::Trace;

/// The normalized input of one run. Created by the transport layer and never
/// mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub query: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub project_id: String,
    /// Entity hints supplied by the caller for knowledge enrichment.
    #[serde(default)]
    pub context_entities: Vec<String>,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    /// Optional provider override, e.g. "openai".
    #[serde(default)]
    pub provider: Option<String>,
    /// Optional model override, e.g. "gpt-4o-mini".
    #[serde(default)]
    pub model: Option<String>,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_scope(mut self, user_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self.project_id = project_id.into();
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryMessage>) -> Self {
        self.history = history;
        self
    }
}

/// Payload handed to the language model for answer generation.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub query: String,
    /// The assembled context, used as the system prompt.
    pub prompt: String,
    pub observations: Vec<Observation>,
    pub history: Vec<HistoryMessage>,
    pub provider: Option<String>,
    pub model: Option<String>,
}

/// Text produced by the language model and who produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
}

impl LlmResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// The final output of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub observations: Vec<Observation>,
    pub trace: Trace,
}
