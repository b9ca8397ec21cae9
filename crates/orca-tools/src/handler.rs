use async_trait::async_trait;
use serde_json::{Map, Value};

use orca_core::{Result, ToolDef, ToolResult};

/// An in-process tool. The catalog routes calls by `definition().name`.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> ToolDef;

    async fn execute(&self, action: &str, args: &Map<String, Value>) -> Result<ToolResult>;
}
