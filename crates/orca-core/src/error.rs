use thiserror::Error;

/// Unified error type for the Orca engine and its collaborators.
#[derive(Error, Debug)]
pub enum OrcaError {
    // ── Request errors ─────────────────────────────────────────
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("run cancelled")]
    Cancelled,

    // ── Planning errors ────────────────────────────────────────
    #[error("planning failed: {0}")]
    Planning(String),

    #[error("planner returned tool plan with no calls")]
    EmptyToolPlan,

    #[error("did not converge: max steps exceeded ({max_steps})")]
    DidNotConverge { max_steps: usize },

    // ── Tool errors ────────────────────────────────────────────
    #[error("tool catalog unavailable: {0}")]
    ToolCatalog(String),

    #[error("tool execution failed: {tool}: {reason}")]
    ToolExecution { tool: String, reason: String },

    #[error("tool timed out after {millis}ms: {tool}")]
    ToolTimeout { tool: String, millis: u128 },

    // ── LLM errors ─────────────────────────────────────────────
    #[error("llm provider error: {0}")]
    LlmProvider(String),

    #[error("llm provider not configured: {0}")]
    ProviderNotConfigured(String),

    // ── Context / memory errors ────────────────────────────────
    #[error("context assembly failed: {0}")]
    Context(String),

    #[error("knowledge lookup failed: {0}")]
    Knowledge(String),

    #[error("memory error: {0}")]
    Memory(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, OrcaError>;
