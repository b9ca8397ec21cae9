use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;

use orca_core::{Result, ToolAction, ToolDef, ToolResult};

use crate::handler::ToolHandler;

const DEFAULT_PROJECT: &str = "default";

/// Default cap on stored entries across all projects.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Project-scoped key-value store exposed as the `store` tool.
///
/// Values live in process memory and are shared by every run. Once
/// `max_entries` keys exist, putting a new key fails; existing keys can
/// still be overwritten.
pub struct KvStoreTool {
    values: RwLock<HashMap<(String, String), Value>>,
    max_entries: usize,
}

impl Default for KvStoreTool {
    fn default() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl KvStoreTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    fn project(args: &Map<String, Value>) -> String {
        args.get("projectId")
            .and_then(|v| v.as_str())
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PROJECT)
            .to_string()
    }

    fn key(args: &Map<String, Value>) -> Option<String> {
        args.get("key")
            .and_then(|v| v.as_str())
            .filter(|k| !k.is_empty())
            .map(String::from)
    }

    fn get(&self, args: &Map<String, Value>) -> ToolResult {
        let Some(key) = Self::key(args) else {
            return failed("key is required");
        };
        let project = Self::project(args);
        let value = self.values.read().get(&(project, key.clone())).cloned();

        let mut data = Map::new();
        data.insert("key".into(), Value::String(key.clone()));
        match value {
            Some(v) => {
                data.insert("value".into(), v);
                ToolResult::ok(data)
            }
            None => {
                data.insert("value".into(), Value::Null);
                ToolResult::ok(data).with_message(format!("no value stored for {key}"))
            }
        }
    }

    fn put(&self, args: &Map<String, Value>) -> ToolResult {
        let Some(key) = Self::key(args) else {
            return failed("key is required");
        };
        let Some(value) = args.get("value").cloned() else {
            return failed("value is required");
        };
        let entry = (Self::project(args), key.clone());
        {
            let mut values = self.values.write();
            if !values.contains_key(&entry) && values.len() >= self.max_entries {
                return failed(&format!("store is full ({} entries)", self.max_entries));
            }
            values.insert(entry, value);
        }

        let mut data = Map::new();
        data.insert("key".into(), Value::String(key.clone()));
        ToolResult::ok(data).with_message(format!("stored {key}"))
    }
}

fn failed(message: &str) -> ToolResult {
    ToolResult {
        success: false,
        data: Map::new(),
        message: message.to_string(),
    }
}

#[async_trait]
impl ToolHandler for KvStoreTool {
    fn definition(&self) -> ToolDef {
        ToolDef::new("store", "Key-value storage scoped to the current project.")
            .with_action(
                ToolAction::new("kv_get", "Get value by key (key, projectId) -> value").with_schema(
                    r#"{"type":"object","properties":{"key":{"type":"string"},"projectId":{"type":"string"}},"required":["key"]}"#,
                ),
            )
            .with_action(
                ToolAction::new("kv_put", "Store value by key (key, value, projectId)").with_schema(
                    r#"{"type":"object","properties":{"key":{"type":"string"},"value":{},"projectId":{"type":"string"}},"required":["key","value"]}"#,
                ),
            )
    }

    async fn execute(&self, action: &str, args: &Map<String, Value>) -> Result<ToolResult> {
        Ok(match action {
            "kv_get" => self.get(args),
            "kv_put" => self.put(args),
            other => failed(&format!("unknown action: {other}")),
        })
    }
}
