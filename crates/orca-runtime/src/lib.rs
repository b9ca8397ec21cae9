//! # orca-runtime
//!
//! The orchestration engine. [`Engine`] fetches the tool catalog, builds the
//! context, and loops plan → validate → policy → dispatch → fold for at most
//! `max_steps` steps before answering, asking for clarification, or giving
//! up. [`HeuristicPlanner`] is the deterministic default planner;
//! [`ModelPlanner`] asks a language model for each decision instead.

pub mod engine;
pub mod model_planner;
pub mod planner;
pub mod validate;

pub use engine::{Engine, EngineBuilder};
pub use model_planner::ModelPlanner;
pub use planner::HeuristicPlanner;
pub use validate::validate_call;
