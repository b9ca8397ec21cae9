//! Contracts for the pluggable collaborators driven by the engine.
//!
//! None of these take a cancellation token: the engine races every call
//! against the caller's token, so implementations only need to be
//! cancel-safe (dropping the future must not corrupt shared state).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::message::Role;
use crate::plan::{Plan, PlanInput};
use crate::tool::{Observation, ToolDef};
use crate::types::{LlmRequest, LlmResponse, Request};

/// Decides the next step of a run. Given equal input it must return an
/// equal plan.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, input: &PlanInput) -> Result<Plan>;
}

/// Produces the final answer text.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn respond(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Best-effort conversational memory written at the end of a run.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn add_turn(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<()>;

    async fn store_fact(&self, session_id: &str, observation: &Observation) -> Result<()>;
}

/// Builds the prompt for a run and folds tool observations into it.
#[async_trait]
pub trait ContextAssembler: Send + Sync {
    async fn build(&self, request: &Request, tools: &[ToolDef]) -> Result<String>;

    /// Append `observations` to `prompt`. Must return `prompt` unchanged
    /// when `observations` is empty, and must never rewrite what is already
    /// in `prompt`.
    async fn append_observations(&self, prompt: &str, observations: &[Observation])
    -> Result<String>;
}

/// Yes/no gate on a tool name, checked right before dispatch.
pub trait Policy: Send + Sync {
    fn allow_tool(&self, name: &str) -> bool;
}
