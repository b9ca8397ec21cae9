use std::sync::Arc;
use tracing::{debug, warn};

use orca_config::PolicyConfig;
use orca_core::Policy;

use crate::budget::BudgetPolicy;

/// Permits every tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllPolicy;

impl Policy for AllowAllPolicy {
    fn allow_tool(&self, _name: &str) -> bool {
        true
    }
}

/// Name-based gate. The deny-list is checked first; a non-empty allow-list
/// then restricts dispatch to the names it contains.
#[derive(Debug, Clone, Default)]
pub struct ListPolicy {
    allowlist: Vec<String>,
    denylist: Vec<String>,
}

impl ListPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allowlist(mut self, list: Vec<String>) -> Self {
        self.allowlist = list;
        self
    }

    pub fn with_denylist(mut self, list: Vec<String>) -> Self {
        self.denylist = list;
        self
    }

    pub fn allowlist(&self) -> &[String] {
        &self.allowlist
    }

    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }
}

impl Policy for ListPolicy {
    fn allow_tool(&self, name: &str) -> bool {
        if self.denylist.iter().any(|d| d == name) {
            warn!(tool = %name, "tool is on denylist");
            return false;
        }
        if !self.allowlist.is_empty() && !self.allowlist.iter().any(|a| a == name) {
            debug!(tool = %name, "tool not on allowlist");
            return false;
        }
        true
    }
}

/// Build the policy stack described by `[policy]`.
pub fn from_config(config: &PolicyConfig) -> Arc<dyn Policy> {
    let lists = config.allowlist.is_empty() && config.denylist.is_empty();
    let base: Arc<dyn Policy> = if lists {
        Arc::new(AllowAllPolicy)
    } else {
        Arc::new(
            ListPolicy::new()
                .with_allowlist(config.allowlist.clone())
                .with_denylist(config.denylist.clone()),
        )
    };

    if config.daily_tool_call_limit > 0 {
        Arc::new(BudgetPolicy::new(base, config.daily_tool_call_limit))
    } else {
        base
    }
}
