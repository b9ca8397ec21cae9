use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::debug;

use orca_core::Result;

use crate::backend::MemoryBackend;
use crate::types::{Session, Turn};

/// Folds old turns into the session's rolling summary.
///
/// Summaries are built without a model: each turn contributes its first
/// sentence (or its first 100 characters).
pub struct SessionCompressor {
    backend: Arc<dyn MemoryBackend>,
    compression_age: Duration,
}

impl SessionCompressor {
    pub fn new(backend: Arc<dyn MemoryBackend>, compression_age: Duration) -> Self {
        Self {
            backend,
            compression_age,
        }
    }

    /// Compress turns older than the configured age and append their summary
    /// to the session. Returns how many turns were compressed.
    pub async fn compress_session(&self, session_id: &str) -> Result<usize> {
        let turns = self
            .backend
            .compress_turns(session_id, self.compression_age)
            .await?;
        if turns.is_empty() {
            return Ok(0);
        }

        let addition = summarize(&turns);
        let mut session = self
            .backend
            .get_session(session_id)
            .await?
            .unwrap_or_else(|| Session::new(session_id));
        session.summary = if session.summary.is_empty() {
            addition
        } else {
            format!("{}\n\n{}", session.summary, addition)
        };
        session.last_activity = Utc::now();
        self.backend.update_session(&session).await?;

        debug!(session = %session_id, count = turns.len(), "session summary extended");
        Ok(turns.len())
    }
}

/// One bullet per turn: `- role: first sentence`.
pub fn summarize(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|t| format!("- {}: {}", t.role.as_str(), first_sentence(&t.content)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn first_sentence(content: &str) -> String {
    let head: String = content.chars().take(100).collect();
    if let Some(idx) = head.find('.') {
        if idx > 0 {
            return head[..=idx].to_string();
        }
    }
    if content.chars().count() > 100 {
        format!("{}...", head)
    } else {
        content.to_string()
    }
}
