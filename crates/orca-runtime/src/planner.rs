use async_trait::async_trait;
use serde_json::{Map, Value};

use orca_config::PlannerConfig;
use orca_core::{Plan, PlanInput, Planner, Request, Result, ToolCall, ToolDef};

const TOOL_MARKER: &str = "tool:";
const CLARIFY: &str = "Which tool and action should I use? Example: tool:app/jira.search";

/// Deterministic rule-based planner.
///
/// Decides, in order:
/// 1. any observation this run → `Direct` (one tool pass per run);
/// 2. an explicit `tool:<name>[.<action>]` or `tool:<a>/<b>/<action>` marker
///    → that call, or a clarification when no action can be resolved.
///    `tool:<name>/<action>` resolves against the catalog: a whole-token
///    tool name wins, else the last segment is taken as an action of
///    `<name>`;
/// 3. a configured keyword in the query that also appears in a tool name;
/// 4. the first tool exposing a search-style action;
/// 5. `Direct`.
///
/// Every generated call carries `query` and, when known, `userId` and
/// `projectId`.
#[derive(Debug, Clone)]
pub struct HeuristicPlanner {
    keywords: Vec<String>,
    search_actions: Vec<String>,
}

impl Default for HeuristicPlanner {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}

impl HeuristicPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            keywords: config.keywords.iter().map(|k| k.to_lowercase()).collect(),
            search_actions: config.search_actions.clone(),
        }
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
        self
    }

    /// First declared action of `tool` that is search-like, else its first action.
    fn infer_action(&self, tool_name: &str, tools: &[ToolDef]) -> Option<String> {
        let tool = tools.iter().find(|t| t.name == tool_name)?;
        tool.actions
            .iter()
            .find(|a| self.is_search_action(&a.name))
            .or_else(|| tool.actions.first())
            .map(|a| a.name.clone())
    }

    fn is_search_action(&self, name: &str) -> bool {
        self.search_actions.iter().any(|s| s == name)
    }

    /// Parse the token following `tool:`. `None` when no action can be found.
    fn parse_marker(&self, token: &str, input: &PlanInput) -> Option<ToolCall> {
        let (mut name, mut action) = match token.split_once('.') {
            Some((name, action)) => (name.to_string(), action.to_string()),
            None => (token.to_string(), String::new()),
        };

        if action.is_empty() && token.contains('/') {
            let parts: Vec<&str> = token.split('/').collect();
            if parts.len() >= 3 {
                name = parts[..parts.len() - 1].join("/");
                action = parts[parts.len() - 1].to_string();
            } else if let Some((tool, act)) = split_known_action(token, &input.tools) {
                name = tool.to_string();
                action = act.to_string();
            }
        }

        if action.is_empty() {
            action = self.infer_action(&name, &input.tools)?;
        }
        Some(call(name, action, &input.request))
    }

    fn pick_by_keyword(&self, query: &str, input: &PlanInput) -> Option<ToolCall> {
        for kw in self.keywords.iter().filter(|kw| query.contains(kw.as_str())) {
            for tool in &input.tools {
                if !tool.name.to_lowercase().contains(kw.as_str()) {
                    continue;
                }
                if let Some(action) = self.infer_action(&tool.name, &input.tools) {
                    return Some(call(tool.name.clone(), action, &input.request));
                }
            }
        }
        None
    }

    fn pick_search_tool(&self, input: &PlanInput) -> Option<ToolCall> {
        input.tools.iter().find_map(|tool| {
            tool.actions
                .iter()
                .find(|a| self.is_search_action(&a.name))
                .map(|a| call(tool.name.clone(), a.name.clone(), &input.request))
        })
    }
}

/// `<tool>/<action>` when `token` is not itself a catalog tool but its
/// prefix is one declaring that action.
fn split_known_action<'a>(token: &'a str, tools: &[ToolDef]) -> Option<(&'a str, &'a str)> {
    if tools.iter().any(|t| t.name == token) {
        return None;
    }
    let (tool, action) = token.rsplit_once('/')?;
    tools
        .iter()
        .find(|t| t.name == tool)?
        .actions
        .iter()
        .any(|a| a.name == action)
        .then_some((tool, action))
}

fn default_args(request: &Request) -> Map<String, Value> {
    let mut args = Map::new();
    args.insert("query".into(), Value::String(request.query.clone()));
    if !request.user_id.is_empty() {
        args.insert("userId".into(), Value::String(request.user_id.clone()));
    }
    if !request.project_id.is_empty() {
        args.insert("projectId".into(), Value::String(request.project_id.clone()));
    }
    args
}

fn call(name: String, action: String, request: &Request) -> ToolCall {
    ToolCall {
        name,
        action,
        args: default_args(request),
    }
}

#[async_trait]
impl Planner for HeuristicPlanner {
    async fn plan(&self, input: &PlanInput) -> Result<Plan> {
        if !input.observations.is_empty() {
            return Ok(Plan::Direct);
        }

        let query = input.request.query.as_str();
        // ASCII lowering keeps byte offsets aligned with `query`.
        let lowered = query.to_ascii_lowercase();

        if let Some(idx) = lowered.find(TOOL_MARKER) {
            let rest = &query[idx + TOOL_MARKER.len()..];
            return Ok(rest
                .split_whitespace()
                .next()
                .and_then(|token| self.parse_marker(token, input))
                .map(|c| Plan::tool_calls(vec![c]))
                .unwrap_or_else(|| Plan::clarify(CLARIFY)));
        }

        if input.tools.is_empty() {
            return Ok(Plan::Direct);
        }

        let lowered = query.to_lowercase();
        Ok(self
            .pick_by_keyword(&lowered, input)
            .or_else(|| self.pick_search_tool(input))
            .map(|c| Plan::tool_calls(vec![c]))
            .unwrap_or(Plan::Direct))
    }
}
