//! # orca-policy
//!
//! Tool gating for the Orca engine. A policy answers one question right
//! before a tool call is dispatched: may this tool run?
//!
//! - [`AllowAllPolicy`]: the default, never blocks.
//! - [`ListPolicy`]: deny-list and allow-list by tool name.
//! - [`BudgetPolicy`]: caps tool dispatches per UTC day, layered on another policy.

pub mod budget;
pub mod policy;

pub use budget::{BudgetPolicy, BudgetState};
pub use policy::{AllowAllPolicy, ListPolicy, from_config};
