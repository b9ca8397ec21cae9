use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use orca_core::Policy;

/// Caps tool dispatches per UTC day across every run sharing this policy.
///
/// The inner policy is consulted first; only calls it allows count against
/// the budget.
pub struct BudgetPolicy {
    inner: Arc<dyn Policy>,
    state: RwLock<BudgetState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetState {
    /// Current day (resets daily).
    pub current_day: String,
    /// Tool calls allowed today.
    pub daily_tool_calls: u64,
    pub daily_limit: u64,
    /// Tool calls allowed since tracking started.
    pub total_tool_calls: u64,
    /// Tool calls refused because the budget was spent.
    pub rejected_tool_calls: u64,
}

impl BudgetPolicy {
    pub fn new(inner: Arc<dyn Policy>, daily_limit: u64) -> Self {
        Self {
            inner,
            state: RwLock::new(BudgetState {
                current_day: today(),
                daily_tool_calls: 0,
                daily_limit,
                total_tool_calls: 0,
                rejected_tool_calls: 0,
            }),
        }
    }

    /// Calls still available today.
    pub fn remaining(&self) -> u64 {
        let state = self.state.read();
        if state.current_day != today() {
            return state.daily_limit;
        }
        state.daily_limit.saturating_sub(state.daily_tool_calls)
    }

    pub fn snapshot(&self) -> BudgetState {
        self.state.read().clone()
    }

    fn maybe_reset_day(state: &mut BudgetState) {
        let day = today();
        if state.current_day != day {
            state.current_day = day;
            state.daily_tool_calls = 0;
        }
    }
}

impl Policy for BudgetPolicy {
    fn allow_tool(&self, name: &str) -> bool {
        if !self.inner.allow_tool(name) {
            return false;
        }

        let mut state = self.state.write();
        Self::maybe_reset_day(&mut state);

        if state.daily_tool_calls >= state.daily_limit {
            state.rejected_tool_calls += 1;
            warn!(
                tool = %name,
                used = state.daily_tool_calls,
                limit = state.daily_limit,
                "daily tool call budget exhausted"
            );
            return false;
        }

        state.daily_tool_calls += 1;
        state.total_tool_calls += 1;
        true
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
