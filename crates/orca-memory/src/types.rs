use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use orca_core::Role;

/// Per-conversation state kept between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Rolling summary of compressed turns.
    pub summary: String,
    pub turn_count: u64,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: String::new(),
            turn_count: 0,
            last_activity: Utc::now(),
        }
    }
}

/// One recorded conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    /// Shortened form used once the turn is compressed.
    pub summary: String,
    pub compressed: bool,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(
        session_id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            role,
            content: content.into(),
            summary: String::new(),
            compressed: false,
            created_at,
        }
    }

    /// The summary for compressed turns, the full content otherwise.
    pub fn display_content(&self) -> &str {
        if self.compressed && !self.summary.is_empty() {
            &self.summary
        } else {
            &self.content
        }
    }
}

/// A structured fact about an entity, e.g. the result of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub entity_id: String,
    pub session_id: String,
    /// "tool_observation", "mentioned", "created", ...
    pub fact_type: String,
    pub content: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl Fact {
    pub fn new(
        entity_id: impl Into<String>,
        session_id: impl Into<String>,
        fact_type: impl Into<String>,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entity_id: entity_id.into(),
            session_id: session_id.into(),
            fact_type: fact_type.into(),
            content: content.into(),
            source: source.into(),
            created_at: Utc::now(),
        }
    }
}
