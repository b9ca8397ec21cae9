use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use orca_core::{OrcaError, Result, Role, truncate_chars};

use crate::backend::MemoryBackend;
use crate::keywords::{extract_keywords, relevance};
use crate::types::{Fact, Session, Turn};

/// Rows scanned per relevance query. Older turns are only reachable via the
/// session summary.
const SEARCH_WINDOW: i64 = 500;

/// Length of the summary kept for a compressed turn.
const COMPRESSED_TURN_CHARS: usize = 200;

/// SQLite-backed memory.
pub struct SqliteMemory {
    db: Arc<Mutex<Connection>>,
}

impl SqliteMemory {
    /// Open or create the memory database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        info!(?path, "opening memory store");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|e| OrcaError::Memory(e.to_string()))?;
        Self::init(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| OrcaError::Memory(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| OrcaError::Memory(e.to_string()))?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                summary TEXT NOT NULL DEFAULT '',
                turn_count INTEGER NOT NULL DEFAULT 0,
                last_activity TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS turns (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                compressed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS facts (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                entity_id TEXT NOT NULL,
                session_id TEXT NOT NULL,
                fact_type TEXT NOT NULL,
                content TEXT NOT NULL,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_turns_session ON turns(session_id, created_at);
            CREATE INDEX IF NOT EXISTS idx_facts_entity ON facts(entity_id);
            ",
        )
        .map_err(|e| OrcaError::Memory(e.to_string()))?;

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of stored turns for a session.
    pub fn turn_count(&self, session_id: &str) -> Result<usize> {
        let db = self.db.lock();
        let n: i64 = db
            .query_row(
                "SELECT COUNT(*) FROM turns WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .map_err(|e| OrcaError::Memory(e.to_string()))?;
        Ok(n as usize)
    }

    fn session_turns(&self, session_id: &str, limit: i64) -> Result<Vec<Turn>> {
        let db = self.db.lock();
        let mut stmt = db
            .prepare(
                "SELECT id, session_id, role, content, summary, compressed, created_at
                 FROM turns WHERE session_id = ?1
                 ORDER BY created_at DESC, seq DESC LIMIT ?2",
            )
            .map_err(|e| OrcaError::Memory(e.to_string()))?;
        let rows = stmt
            .query_map(params![session_id, limit], row_to_turn)
            .map_err(|e| OrcaError::Memory(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| OrcaError::Memory(e.to_string()))
    }

    /// The newest `limit` facts across all entities.
    fn latest_facts(&self, limit: i64) -> Result<Vec<Fact>> {
        let db = self.db.lock();
        let mut stmt = db
            .prepare(
                "SELECT id, entity_id, session_id, fact_type, content, source, created_at
                 FROM facts ORDER BY created_at DESC, seq DESC LIMIT ?1",
            )
            .map_err(|e| OrcaError::Memory(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit], row_to_fact)
            .map_err(|e| OrcaError::Memory(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| OrcaError::Memory(e.to_string()))
    }
}

#[async_trait]
impl MemoryBackend for SqliteMemory {
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let db = self.db.lock();
        db.query_row(
            "SELECT id, summary, turn_count, last_activity FROM sessions WHERE id = ?1",
            params![session_id],
            |row| {
                let turn_count: i64 = row.get(2)?;
                let last: String = row.get(3)?;
                Ok(Session {
                    id: row.get(0)?,
                    summary: row.get(1)?,
                    turn_count: turn_count.max(0) as u64,
                    last_activity: parse_ts(&last),
                })
            },
        )
        .optional()
        .map_err(|e| OrcaError::Memory(e.to_string()))
    }

    async fn update_session(&self, session: &Session) -> Result<()> {
        let db = self.db.lock();
        db.execute(
            "INSERT INTO sessions (id, summary, turn_count, last_activity)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                summary = excluded.summary,
                turn_count = excluded.turn_count,
                last_activity = excluded.last_activity",
            params![
                session.id,
                session.summary,
                session.turn_count as i64,
                fmt_ts(&session.last_activity),
            ],
        )
        .map_err(|e| OrcaError::Memory(e.to_string()))?;
        Ok(())
    }

    async fn add_turn(&self, turn: &Turn) -> Result<()> {
        let mut db = self.db.lock();
        let tx = db
            .transaction()
            .map_err(|e| OrcaError::Memory(e.to_string()))?;
        let at = fmt_ts(&turn.created_at);
        tx.execute(
            "INSERT INTO turns (id, session_id, role, content, summary, compressed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                turn.id,
                turn.session_id,
                turn.role.as_str(),
                turn.content,
                turn.summary,
                turn.compressed,
                at,
            ],
        )
        .map_err(|e| OrcaError::Memory(e.to_string()))?;
        tx.execute(
            "INSERT INTO sessions (id, summary, turn_count, last_activity)
             VALUES (?1, '', 1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                turn_count = sessions.turn_count + 1,
                last_activity = MAX(sessions.last_activity, excluded.last_activity)",
            params![turn.session_id, at],
        )
        .map_err(|e| OrcaError::Memory(e.to_string()))?;
        tx.commit().map_err(|e| OrcaError::Memory(e.to_string()))?;
        debug!(session = %turn.session_id, role = %turn.role, "turn recorded");
        Ok(())
    }

    async fn recent_turns(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut turns = self.session_turns(session_id, limit as i64)?;
        // Loaded newest first
        turns.reverse();
        Ok(turns)
    }

    async fn search_turns(&self, session_id: &str, query: &str, limit: usize) -> Result<Vec<Turn>> {
        let keywords = extract_keywords(query);
        if keywords.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(usize, Turn)> = self
            .session_turns(session_id, SEARCH_WINDOW)?
            .into_iter()
            .filter_map(|t| {
                let score = relevance(&t.content, &keywords);
                (score > 0).then_some((score, t))
            })
            .collect();
        // Stable: equal scores keep newest-first order
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(limit);
        Ok(scored.into_iter().map(|(_, t)| t).collect())
    }

    async fn compress_turns(&self, session_id: &str, older_than: Duration) -> Result<Vec<Turn>> {
        // Nothing can be older than the earliest representable instant.
        let Some(cutoff) = Utc::now().checked_sub_signed(older_than) else {
            return Ok(Vec::new());
        };
        let threshold = fmt_ts(&cutoff);
        let mut db = self.db.lock();
        let tx = db
            .transaction()
            .map_err(|e| OrcaError::Memory(e.to_string()))?;

        let mut turns = {
            let mut stmt = tx
                .prepare(
                    "SELECT id, session_id, role, content, summary, compressed, created_at
                     FROM turns
                     WHERE session_id = ?1 AND compressed = 0 AND created_at < ?2
                     ORDER BY created_at ASC, seq ASC",
                )
                .map_err(|e| OrcaError::Memory(e.to_string()))?;
            let rows = stmt
                .query_map(params![session_id, threshold], row_to_turn)
                .map_err(|e| OrcaError::Memory(e.to_string()))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| OrcaError::Memory(e.to_string()))?
        };

        for turn in &mut turns {
            if turn.summary.is_empty() {
                turn.summary = truncate_chars(&turn.content, COMPRESSED_TURN_CHARS);
            }
            turn.compressed = true;
            tx.execute(
                "UPDATE turns SET compressed = 1, summary = ?2 WHERE id = ?1",
                params![turn.id, turn.summary],
            )
            .map_err(|e| OrcaError::Memory(e.to_string()))?;
        }
        tx.commit().map_err(|e| OrcaError::Memory(e.to_string()))?;

        if !turns.is_empty() {
            debug!(session = %session_id, count = turns.len(), "turns compressed");
        }
        Ok(turns)
    }

    async fn store_fact(&self, fact: &Fact) -> Result<()> {
        let db = self.db.lock();
        db.execute(
            "INSERT INTO facts (id, entity_id, session_id, fact_type, content, source, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                fact.id,
                fact.entity_id,
                fact.session_id,
                fact.fact_type,
                fact.content,
                fact.source,
                fmt_ts(&fact.created_at),
            ],
        )
        .map_err(|e| OrcaError::Memory(e.to_string()))?;
        Ok(())
    }

    async fn search_facts(&self, query: &str, limit: usize) -> Result<Vec<Fact>> {
        let keywords = extract_keywords(query);
        if keywords.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(usize, Fact)> = self
            .latest_facts(SEARCH_WINDOW)?
            .into_iter()
            .filter_map(|f| {
                let text = format!("{} {}", f.entity_id, f.content);
                let score = relevance(&text, &keywords);
                (score > 0).then_some((score, f))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(limit);
        Ok(scored.into_iter().map(|(_, f)| f).collect())
    }
}

fn row_to_turn(row: &Row<'_>) -> rusqlite::Result<Turn> {
    let role: String = row.get(2)?;
    let created: String = row.get(6)?;
    Ok(Turn {
        id: row.get(0)?,
        session_id: row.get(1)?,
        role: Role::parse(&role),
        content: row.get(3)?,
        summary: row.get(4)?,
        compressed: row.get(5)?,
        created_at: parse_ts(&created),
    })
}

fn row_to_fact(row: &Row<'_>) -> rusqlite::Result<Fact> {
    let created: String = row.get(6)?;
    Ok(Fact {
        id: row.get(0)?,
        entity_id: row.get(1)?,
        session_id: row.get(2)?,
        fact_type: row.get(3)?,
        content: row.get(4)?,
        source: row.get(5)?,
        created_at: parse_ts(&created),
    })
}

// Fixed-width UTC timestamps so text comparison in SQL matches time order.
fn fmt_ts(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
