use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::warn;

use orca_core::{MemoryStore, Observation, Result, Role};

use crate::backend::MemoryBackend;
use crate::compressor::SessionCompressor;
use crate::types::{Fact, Turn};

/// Fact type recorded for tool results.
pub const TOOL_OBSERVATION: &str = "tool_observation";

/// Exposes a [`MemoryBackend`] to the engine.
///
/// Failures are logged here and returned; the engine decides whether to care.
/// When compression is enabled, every assistant turn triggers a compression
/// pass over the session.
pub struct MemoryAdapter {
    backend: Arc<dyn MemoryBackend>,
    compressor: Option<SessionCompressor>,
}

impl MemoryAdapter {
    pub fn new(backend: Arc<dyn MemoryBackend>) -> Self {
        Self {
            backend,
            compressor: None,
        }
    }

    /// Fold turns older than `age` into the session summary. An age too
    /// large to represent leaves compression off.
    pub fn with_compression(mut self, age: std::time::Duration) -> Self {
        match Duration::from_std(age) {
            Ok(age) => {
                self.compressor = Some(SessionCompressor::new(Arc::clone(&self.backend), age));
            }
            Err(_) => {
                warn!(secs = age.as_secs(), "compression age out of range, compression disabled");
            }
        }
        self
    }

    pub fn backend(&self) -> Arc<dyn MemoryBackend> {
        Arc::clone(&self.backend)
    }
}

#[async_trait]
impl MemoryStore for MemoryAdapter {
    async fn add_turn(
        &self,
        session_id: &str,
        role: Role,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let turn = Turn::new(session_id, role, content, at);
        if let Err(e) = self.backend.add_turn(&turn).await {
            warn!(error = %e, session = %session_id, role = %role, "failed to record turn");
            return Err(e);
        }

        if role == Role::Assistant {
            if let Some(ref compressor) = self.compressor {
                if let Err(e) = compressor.compress_session(session_id).await {
                    warn!(error = %e, session = %session_id, "session compression failed");
                }
            }
        }
        Ok(())
    }

    async fn store_fact(&self, session_id: &str, observation: &Observation) -> Result<()> {
        let Some(result) = observation.result() else {
            return Ok(());
        };
        let content = serde_json::to_string(result)?;
        let fact = Fact::new(
            &observation.tool_name,
            session_id,
            TOOL_OBSERVATION,
            content,
            &observation.tool_name,
        );
        if let Err(e) = self.backend.store_fact(&fact).await {
            warn!(error = %e, tool = %observation.tool_name, "failed to store fact");
            return Err(e);
        }
        Ok(())
    }
}
