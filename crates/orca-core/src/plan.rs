use serde::{Deserialize, Serialize};

use crate::tool::{Observation, ToolCall, ToolDef};
use crate::types::Request;

/// One planner decision for the current step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Plan {
    /// Answer now with the language model.
    Direct,
    /// Invoke these tools, in order, before planning again.
    ToolCalls { calls: Vec<ToolCall> },
    /// Ask the user a question instead of answering.
    NeedClarification { question: String },
}

impl Plan {
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Plan::ToolCalls { calls }
    }

    pub fn clarify(question: impl Into<String>) -> Self {
        Plan::NeedClarification {
            question: question.into(),
        }
    }

    /// Short label used in traces and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Plan::Direct => "direct",
            Plan::ToolCalls { .. } => "tool_calls",
            Plan::NeedClarification { .. } => "need_clarification",
        }
    }
}

/// Everything a planner may look at when deciding a step.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    pub request: Request,
    /// The current assembled context.
    pub prompt: String,
    pub tools: Vec<ToolDef>,
    /// Observations accumulated so far in this run, in issue order.
    pub observations: Vec<Observation>,
    /// 1-based step number.
    pub step: usize,
}
