//! Knowledge-graph enrichment.
//!
//! A [`KnowledgeSource`] resolves the entities a request mentions into graph
//! nodes; the assembler renders the result right after the system prompt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use orca_core::Result;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KnowledgeNode {
    pub id: String,
    /// "ticket", "pr", "file", "service", ...
    pub entity_type: String,
    pub display_name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KnowledgeEdge {
    pub from: String,
    pub to: String,
    pub relationship: String,
}

/// What a lookup found for one request.
///
/// `edges[i]` describes how `related[i]` connects to the retrieved nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KnowledgeContext {
    pub retrieved: Vec<KnowledgeNode>,
    pub related: Vec<KnowledgeNode>,
    pub edges: Vec<KnowledgeEdge>,
}

impl KnowledgeContext {
    pub fn is_empty(&self) -> bool {
        self.retrieved.is_empty() && self.related.is_empty()
    }

    /// Markdown rendering; empty when nothing was found.
    pub fn format_for_llm(&self) -> String {
        let mut sections = Vec::new();

        if !self.retrieved.is_empty() {
            let mut lines = vec!["## Knowledge Graph Context".to_string()];
            for n in &self.retrieved {
                let props = format_properties(&n.properties);
                lines.push(format!(
                    "- [{}] **{}**: {} {}",
                    n.entity_type, n.id, n.display_name, props
                ));
            }
            sections.push(lines.join("\n"));
        }

        if !self.related.is_empty() {
            let mut lines = vec!["## Related Items".to_string()];
            for (i, n) in self.related.iter().enumerate() {
                let relationship = self
                    .edges
                    .get(i)
                    .map(|e| e.relationship.as_str())
                    .unwrap_or_default();
                lines.push(format!(
                    "- [{}] {} ({})",
                    n.entity_type, n.display_name, relationship
                ));
            }
            sections.push(lines.join("\n"));
        }

        sections.join("\n\n")
    }
}

fn format_properties(props: &BTreeMap<String, Value>) -> String {
    let parts: Vec<String> = props
        .iter()
        .filter(|(k, v)| !(k.as_str() == "source" && v.as_str() == Some("stub")))
        .map(|(k, v)| match v {
            Value::String(s) => format!("{k}: {s}"),
            other => format!("{k}: {other}"),
        })
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("({})", parts.join(", "))
    }
}

/// Resolves a query and caller-supplied entity hints into graph context.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    async fn lookup(&self, query: &str, entity_hints: &[String]) -> Result<KnowledgeContext>;
}
