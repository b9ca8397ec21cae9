//! # orca-core
//!
//! Core types, collaborator traits, and primitives for the Orca orchestration
//! engine. This crate defines the shared vocabulary used by every other crate
//! in the workspace: the request/response values that flow through one run,
//! the tool and plan types, and the contracts each pluggable collaborator
//! (planner, LLM client, tool registry/executor, memory, context assembler,
//! policy) must satisfy.

pub mod collab;
pub mod error;
pub mod message;
pub mod plan;
pub mod text;
pub mod tool;
pub mod trace;
pub mod types;

pub use collab::{ContextAssembler, LlmClient, MemoryStore, Planner, Policy};
pub use error::{OrcaError, Result};
pub use message::{HistoryMessage, Role};
pub use plan::{Plan, PlanInput};
pub use text::truncate_chars;
pub use tool::{
    Observation, ObservationOutcome, ToolAction, ToolCall, ToolDef, ToolExecutor, ToolRegistry,
    ToolResult,
};
pub use trace::{Trace, TraceEvent};
pub use types::*;
