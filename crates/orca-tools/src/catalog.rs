use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use orca_core::{OrcaError, Result, ToolCall, ToolDef, ToolExecutor, ToolRegistry, ToolResult};

use crate::handler::ToolHandler;

struct Entry {
    handler: Arc<dyn ToolHandler>,
    /// Projects that may see this tool. Empty = every project.
    projects: Vec<String>,
}

impl Entry {
    fn visible_to(&self, project_id: &str) -> bool {
        self.projects.is_empty() || self.projects.iter().any(|p| p == project_id)
    }
}

struct Fallback {
    registry: Arc<dyn ToolRegistry>,
    executor: Arc<dyn ToolExecutor>,
}

/// In-process tool catalog.
///
/// Handlers are listed in registration order. When a fallback catalog is
/// attached (usually a [`crate::RemoteToolService`]), its tools are listed
/// after the local ones and calls for names with no local handler are sent
/// there. A local handler shadows a fallback tool of the same name.
#[derive(Default)]
pub struct LocalToolCatalog {
    entries: Vec<Entry>,
    fallback: Option<Fallback>,
}

impl LocalToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler visible to every project.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.register_scoped(handler, Vec::new());
    }

    /// Register a handler visible only to the given projects.
    pub fn register_scoped(&mut self, handler: Arc<dyn ToolHandler>, projects: Vec<String>) {
        let name = handler.definition().name;
        debug!(tool = %name, projects = projects.len(), "registered tool handler");
        self.entries.retain(|e| e.handler.definition().name != name);
        self.entries.push(Entry { handler, projects });
    }

    pub fn with_handler(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn with_scoped_handler(mut self, handler: Arc<dyn ToolHandler>, projects: &[&str]) -> Self {
        self.register_scoped(handler, projects.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn with_fallback<T>(mut self, remote: Arc<T>) -> Self
    where
        T: ToolRegistry + ToolExecutor + 'static,
    {
        self.fallback = Some(Fallback {
            registry: remote.clone(),
            executor: remote,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, name: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.handler.definition().name == name)
    }
}

#[async_trait]
impl ToolRegistry for LocalToolCatalog {
    async fn list_tools(&self, user_id: &str, project_id: &str) -> Result<Vec<ToolDef>> {
        let mut tools: Vec<ToolDef> = self
            .entries
            .iter()
            .filter(|e| e.visible_to(project_id))
            .map(|e| e.handler.definition())
            .collect();

        if let Some(ref fallback) = self.fallback {
            match fallback.registry.list_tools(user_id, project_id).await {
                Ok(remote) => {
                    for def in remote {
                        if self.find(&def.name).is_none() {
                            tools.push(def);
                        }
                    }
                }
                Err(e) => warn!(error = %e, "remote tool listing failed, serving local tools only"),
            }
        }

        Ok(tools)
    }
}

#[async_trait]
impl ToolExecutor for LocalToolCatalog {
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        if let Some(entry) = self.find(&call.name) {
            let project = call
                .args
                .get("projectId")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            if !entry.visible_to(project) {
                return Err(OrcaError::ToolExecution {
                    tool: call.name.clone(),
                    reason: format!("not available in project '{project}'"),
                });
            }
            debug!(tool = %call.name, action = %call.action, "executing local tool");
            return entry.handler.execute(&call.action, &call.args).await;
        }

        match self.fallback {
            Some(ref fallback) => fallback.executor.execute(call).await,
            None => Err(OrcaError::ToolExecution {
                tool: call.name.clone(),
                reason: "unknown tool".into(),
            }),
        }
    }
}
