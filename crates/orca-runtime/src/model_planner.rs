use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use orca_core::{LlmClient, LlmRequest, OrcaError, Plan, PlanInput, Planner, Result};

/// Planner that asks a language model for each decision.
///
/// The model sees the current context plus a compact catalog and must reply
/// with one JSON object. A reply with no JSON object at all is taken as a
/// plain answer (`Direct`); a JSON object that does not parse as a plan is a
/// planning error. Unlike [`crate::HeuristicPlanner`] this can chain tools
/// across steps, so it is only as deterministic as the model behind it.
pub struct ModelPlanner {
    llm: Arc<dyn LlmClient>,
}

impl ModelPlanner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    fn planning_prompt(input: &PlanInput) -> String {
        let mut out = input.prompt.clone();
        out.push_str("\n\n## Planning Instructions\n");
        out.push_str(&format!(
            "Decide step {} of this run. Reply with exactly one JSON object and nothing else:\n",
            input.step
        ));
        out.push_str("{\"type\":\"direct\"}\n");
        out.push_str(
            "{\"type\":\"tool_calls\",\"calls\":[{\"name\":\"<tool>\",\"action\":\"<action>\",\"args\":{}}]}\n",
        );
        out.push_str("{\"type\":\"need_clarification\",\"question\":\"<question>\"}\n");

        if input.tools.is_empty() {
            out.push_str("No tools are available; choose direct or need_clarification.\n");
        } else {
            out.push_str("Callable tools:\n");
            for t in &input.tools {
                let actions: Vec<&str> = t.actions.iter().map(|a| a.name.as_str()).collect();
                out.push_str(&format!("- {}: {}\n", t.name, actions.join(", ")));
            }
        }
        if !input.observations.is_empty() {
            out.push_str(&format!(
                "{} tool observation(s) are already in the context above. Choose direct once they answer the request.\n",
                input.observations.len()
            ));
        }
        out
    }

    /// The outermost `{...}` span of `text`, if any.
    fn json_span(text: &str) -> Option<&str> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        (end > start).then(|| &text[start..=end])
    }

    fn parse_plan(text: &str, input: &PlanInput) -> Result<Plan> {
        let Some(span) = Self::json_span(text) else {
            return Ok(Plan::Direct);
        };
        let mut plan: Plan = serde_json::from_str(span)
            .map_err(|e| OrcaError::Planning(format!("unparseable plan: {e}")))?;

        // Scope arguments the remote dispatcher expects on every call.
        if let Plan::ToolCalls { ref mut calls } = plan {
            let request = &input.request;
            for call in calls.iter_mut() {
                if !request.user_id.is_empty() {
                    call.args
                        .entry("userId")
                        .or_insert_with(|| Value::String(request.user_id.clone()));
                }
                if !request.project_id.is_empty() {
                    call.args
                        .entry("projectId")
                        .or_insert_with(|| Value::String(request.project_id.clone()));
                }
            }
        }
        Ok(plan)
    }
}

#[async_trait]
impl Planner for ModelPlanner {
    async fn plan(&self, input: &PlanInput) -> Result<Plan> {
        let request = LlmRequest {
            query: input.request.query.clone(),
            prompt: Self::planning_prompt(input),
            observations: input.observations.clone(),
            history: input.request.history.clone(),
            provider: input.request.provider.clone(),
            model: input.request.model.clone(),
        };
        let reply = self.llm.respond(&request).await?;
        let plan = Self::parse_plan(&reply.text, input)?;
        debug!(step = input.step, kind = plan.kind(), "model planner decided");
        Ok(plan)
    }
}
