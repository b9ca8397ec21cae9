use async_trait::async_trait;
use chrono::Duration;

use orca_core::Result;

use crate::types::{Fact, Session, Turn};

/// Storage for sessions, turns, and facts.
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    /// `None` when the session has never been seen.
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>>;

    async fn update_session(&self, session: &Session) -> Result<()>;

    /// Record a turn and bump the owning session's turn count.
    async fn add_turn(&self, turn: &Turn) -> Result<()>;

    /// The last `limit` turns of a session, oldest first.
    async fn recent_turns(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>>;

    /// Up to `limit` turns ranked by keyword overlap with `query`.
    async fn search_turns(&self, session_id: &str, query: &str, limit: usize) -> Result<Vec<Turn>>;

    /// Mark uncompressed turns older than `older_than` as compressed and
    /// return them, oldest first. An age reaching past the earliest
    /// representable time matches nothing.
    async fn compress_turns(&self, session_id: &str, older_than: Duration) -> Result<Vec<Turn>>;

    async fn store_fact(&self, fact: &Fact) -> Result<()>;

    /// Up to `limit` facts ranked by keyword overlap with `query` (entity id
    /// and content), newest first among equal scores.
    async fn search_facts(&self, query: &str, limit: usize) -> Result<Vec<Fact>>;
}
