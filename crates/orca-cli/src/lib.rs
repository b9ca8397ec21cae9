//! # orca-cli
//!
//! Command-line host for the Orca engine.
//!
//! ## Commands
//!
//! - `orca ask <query>`: run one request and print the answer
//! - `orca tools`: list the tools visible to a user and project
//! - `orca config`: show the effective configuration

pub mod commands;
pub mod wiring;

pub use commands::Cli;
pub use wiring::{Runtime, build_llm, build_runtime, build_tools, load_system_prompt};
