//! # orca-memory
//!
//! Conversational memory for the Orca engine.
//!
//! - **Sessions**: a rolling summary per conversation.
//! - **Turns**: every user/assistant message, searchable by keyword relevance.
//! - **Facts**: tool observations recorded at the end of a run.
//!
//! [`MemoryAdapter`] exposes a [`MemoryBackend`] to the engine through the
//! `orca_core::MemoryStore` contract. [`SqliteMemory`] is the bundled backend.

pub mod adapter;
pub mod backend;
pub mod compressor;
pub mod keywords;
pub mod sqlite;
pub mod types;

pub use adapter::MemoryAdapter;
pub use backend::MemoryBackend;
pub use compressor::SessionCompressor;
pub use keywords::extract_keywords;
pub use sqlite::SqliteMemory;
pub use types::{Fact, Session, Turn};
