use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only diagnostic log for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub id: String,
    pub started: DateTime<Utc>,
    pub events: Vec<TraceEvent>,
}

/// A single named, timestamped trace entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub name: String,
    #[serde(default)]
    pub detail: String,
    pub at: DateTime<Utc>,
}

impl Trace {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            started: Utc::now(),
            events: Vec::new(),
        }
    }

    /// A trace with a fresh random id.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn add_event(&mut self, name: impl Into<String>, detail: impl Into<String>) {
        self.events.push(TraceEvent {
            name: name.into(),
            detail: detail.into(),
            at: Utc::now(),
        });
    }

    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.name == name)
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.events.iter().any(|e| e.name == name)
    }

    /// Event names in recording order.
    pub fn names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name.as_str()).collect()
    }
}
