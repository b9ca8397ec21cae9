use async_trait::async_trait;
use orca_core::{HistoryMessage, Result, Role};
use serde::{Deserialize, Serialize};

/// One chat message sent to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl From<&HistoryMessage> for ChatMessage {
    fn from(m: &HistoryMessage) -> Self {
        Self {
            role: m.role,
            content: m.content.clone(),
        }
    }
}

/// A request to an LLM provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Provider-specific model name, e.g. "gpt-4o-mini".
    pub model: String,
    /// System prompt (the assembled context).
    pub system: String,
    /// Prior conversation followed by the new user message.
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A complete response from an LLM provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub text: String,
    /// Model that produced the text, as reported by the provider when known.
    pub model: String,
}

/// Trait implemented by each LLM backend (OpenAI-compatible, Gemini, ...).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Routing name, e.g. "openai", "gemini", "groq".
    fn name(&self) -> &str;

    /// Model used when neither the request nor the router names one.
    fn default_model(&self) -> &str;

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}
