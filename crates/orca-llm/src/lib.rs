//! # orca-llm
//!
//! Answer generation for the Orca engine. [`ProviderRouter`] implements the
//! engine's `LlmClient` contract on top of any number of [`LlmProvider`]s,
//! choosing one per request and retrying transient failures.

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod router;

pub use gemini::GeminiProvider;
pub use mock::{MockLlm, MockProvider};
pub use openai::OpenAiProvider;
pub use provider::{ChatMessage, ChatRequest, ChatResponse, LlmProvider};
pub use router::ProviderRouter;
