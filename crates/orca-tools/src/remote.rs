use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use orca_core::{OrcaError, Result, ToolAction, ToolCall, ToolDef, ToolExecutor, ToolRegistry, ToolResult};

pub const DEFAULT_REMOTE_URL: &str = "http://localhost:9100";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for a remote tool-dispatch service.
///
/// * `GET  {base}/v1/tools?userId=..&projectId=..` → `[ToolDef]`
/// * `POST {base}/v1/tools/execute` with `{name, action, userId, projectId, params}`
///   → `{success, data, message, error}`
pub struct RemoteToolService {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteEnvelope {
    name: String,
    action: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    user_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    project_id: String,
    params: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ExecuteReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Map<String, Value>>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: String,
}

#[derive(Debug, Deserialize)]
struct WireTool {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    actions: Vec<WireAction>,
}

#[derive(Debug, Deserialize)]
struct WireAction {
    name: String,
    #[serde(default)]
    description: String,
    /// Either schema text or an inline JSON object.
    #[serde(default, rename = "inputSchema", alias = "input_schema")]
    input_schema: Value,
}

impl From<WireTool> for ToolDef {
    fn from(t: WireTool) -> Self {
        let mut def = ToolDef::new(t.name, t.description);
        for a in t.actions {
            let schema = match a.input_schema {
                Value::Null => String::new(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            def = def.with_action(ToolAction::new(a.name, a.description).with_schema(schema));
        }
        def
    }
}

impl RemoteToolService {
    /// An empty `base_url` selects [`DEFAULT_REMOTE_URL`].
    pub fn new(base_url: &str) -> Self {
        let base_url = if base_url.trim().is_empty() {
            DEFAULT_REMOTE_URL
        } else {
            base_url.trim()
        };
        Self {
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.auth_token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => self.client = client,
            Err(e) => warn!(error = %e, "failed to build HTTP client, keeping default"),
        }
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Move `userId`/`projectId` out of the call's params into the envelope.
    fn envelope(call: &ToolCall) -> ExecuteEnvelope {
        let mut params = call.args.clone();
        let mut take = |key: &str| match params.remove(key) {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        let user_id = take("userId");
        let project_id = take("projectId");
        ExecuteEnvelope {
            name: call.name.clone(),
            action: call.action.clone(),
            user_id,
            project_id,
            params,
        }
    }

    fn into_result(tool: &str, reply: ExecuteReply) -> Result<ToolResult> {
        if !reply.error.is_empty() {
            return Err(OrcaError::ToolExecution {
                tool: tool.to_string(),
                reason: reply.error,
            });
        }
        Ok(ToolResult {
            success: reply.success,
            data: reply.data.unwrap_or_default(),
            message: reply.message,
        })
    }
}

#[async_trait]
impl ToolRegistry for RemoteToolService {
    async fn list_tools(&self, user_id: &str, project_id: &str) -> Result<Vec<ToolDef>> {
        let mut query = Vec::with_capacity(2);
        if !user_id.is_empty() {
            query.push(("userId", user_id));
        }
        if !project_id.is_empty() {
            query.push(("projectId", project_id));
        }

        let resp = self
            .authorize(self.client.get(format!("{}/v1/tools", self.base_url)))
            .query(&query)
            .send()
            .await
            .map_err(|e| OrcaError::ToolCatalog(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(OrcaError::ToolCatalog(format!(
                "list tools failed: HTTP {}",
                status.as_u16()
            )));
        }

        let tools: Vec<WireTool> = resp
            .json()
            .await
            .map_err(|e| OrcaError::ToolCatalog(e.to_string()))?;
        debug!(count = tools.len(), "listed remote tools");
        Ok(tools.into_iter().map(ToolDef::from).collect())
    }
}

#[async_trait]
impl ToolExecutor for RemoteToolService {
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let fail = |reason: String| OrcaError::ToolExecution {
            tool: call.name.clone(),
            reason,
        };

        let resp = self
            .authorize(self.client.post(format!("{}/v1/tools/execute", self.base_url)))
            .json(&Self::envelope(call))
            .send()
            .await
            .map_err(|e| fail(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(fail(format!("execute failed: HTTP {}", status.as_u16())));
        }

        let reply: ExecuteReply = resp.json().await.map_err(|e| fail(e.to_string()))?;
        Self::into_result(&call.name, reply)
    }
}
