//! # orca-config
//!
//! Configuration system for the Orca engine. Reads from `orca.toml` and
//! environment variables, with environment values overriding the file.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::OrcaConfig;
pub use schema::{
    ConfigWarning, ContextConfig, EngineConfig, LlmConfig, LoggingConfig, MemoryConfig,
    PlannerConfig, PolicyConfig, ToolsConfig, WarningSeverity,
};
