use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A callable capability and its named operations, as visible to one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDef {
    /// Unique name, e.g. "app/jira", "store".
    pub name: String,
    /// Human-readable description for the model.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actions: Vec<ToolAction>,
}

/// A single named operation of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolAction {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema of the argument object, as raw JSON text. Empty = unconstrained.
    #[serde(default, rename = "inputSchema", alias = "input_schema")]
    pub input_schema: String,
}

impl ToolDef {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: ToolAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Look up an action by exact name.
    pub fn action(&self, name: &str) -> Option<&ToolAction> {
        self.actions.iter().find(|a| a.name == name)
    }
}

impl ToolAction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: String::new(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.input_schema = schema.into();
        self
    }

    /// Keys listed in the schema's `required` array, in declaration order.
    ///
    /// An empty, unparseable, or `required`-less schema yields no requirements;
    /// non-string entries are skipped.
    pub fn required_params(&self) -> Vec<String> {
        if self.input_schema.trim().is_empty() {
            return Vec::new();
        }
        let Ok(schema) = serde_json::from_str::<Value>(&self.input_schema) else {
            return Vec::new();
        };
        schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A structured tool invocation requested by a planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub action: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: action.into(),
            args: Map::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// The normalized outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub message: String,
}

impl ToolResult {
    pub fn ok(data: Map<String, Value>) -> Self {
        Self {
            success: true,
            data,
            message: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Either a result or an error, never both and never neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationOutcome {
    Result(ToolResult),
    Error(String),
}

/// The recorded outcome of one attempted tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub tool_name: String,
    #[serde(flatten)]
    pub outcome: ObservationOutcome,
}

impl Observation {
    pub fn success(tool_name: impl Into<String>, result: ToolResult) -> Self {
        Self {
            tool_name: tool_name.into(),
            outcome: ObservationOutcome::Result(result),
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            outcome: ObservationOutcome::Error(error.into()),
        }
    }

    pub fn result(&self) -> Option<&ToolResult> {
        match &self.outcome {
            ObservationOutcome::Result(r) => Some(r),
            ObservationOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ObservationOutcome::Error(e) => Some(e),
            ObservationOutcome::Result(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ObservationOutcome::Error(_))
    }
}

/// Provides the tools visible to a user/project pair.
///
/// An empty list means "no tools available" and is not an error.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    async fn list_tools(&self, user_id: &str, project_id: &str) -> crate::Result<Vec<ToolDef>>;
}

/// Dispatches a single structured tool call to an execution backend.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall) -> crate::Result<ToolResult>;
}
