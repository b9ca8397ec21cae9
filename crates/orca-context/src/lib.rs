//! # orca-context
//!
//! Builds the textual context a run reasons over. [`DefaultContextAssembler`]
//! composes the system prompt, optional knowledge-graph enrichment, session
//! memory, tool descriptions, and the current request, then folds tool
//! observations into that prompt as the run progresses.

pub mod assembler;
pub mod knowledge;
pub mod prompt;
pub mod render;

pub use assembler::DefaultContextAssembler;
pub use knowledge::{KnowledgeContext, KnowledgeEdge, KnowledgeNode, KnowledgeSource};
pub use prompt::DEFAULT_SYSTEM_PROMPT;
