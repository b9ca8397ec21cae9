use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use orca_core::{ContextAssembler, Observation, Request, Result, ToolDef};
use orca_memory::MemoryBackend;

use crate::knowledge::KnowledgeSource;
use crate::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::render;

/// Composes the run context from system prompt, knowledge, memory, tools,
/// and the current request, joined by blank lines.
///
/// Every enrichment step is best-effort: a failing lookup drops its section
/// and is logged, it never fails the build.
pub struct DefaultContextAssembler {
    system_prompt: String,
    memory: Option<Arc<dyn MemoryBackend>>,
    knowledge: Option<Arc<dyn KnowledgeSource>>,
    max_relevant_turns: usize,
    max_recent_turns: usize,
    max_facts: usize,
}

impl Default for DefaultContextAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultContextAssembler {
    pub fn new() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            memory: None,
            knowledge: None,
            max_relevant_turns: 5,
            max_recent_turns: 3,
            max_facts: 3,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryBackend>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_knowledge(mut self, knowledge: Arc<dyn KnowledgeSource>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn with_turn_limits(mut self, relevant: usize, recent: usize) -> Self {
        self.max_relevant_turns = relevant;
        self.max_recent_turns = recent;
        self
    }

    /// How many stored tool facts to surface. 0 skips the lookup.
    pub fn with_fact_limit(mut self, limit: usize) -> Self {
        self.max_facts = limit;
        self
    }

    /// System prompt plus any knowledge-graph context.
    async fn system_section(&self, request: &Request) -> String {
        let mut system = self.system_prompt.clone();
        let Some(ref knowledge) = self.knowledge else {
            return system;
        };
        match knowledge
            .lookup(&request.query, &request.context_entities)
            .await
        {
            Ok(ctx) => {
                let formatted = ctx.format_for_llm();
                if !formatted.is_empty() {
                    if !system.is_empty() {
                        system.push_str("\n\n");
                    }
                    system.push_str(&formatted);
                }
            }
            Err(e) => warn!(error = %e, "knowledge enrichment failed, continuing without it"),
        }
        system
    }

    async fn memory_sections(&self, memory: &dyn MemoryBackend, request: &Request) -> Vec<String> {
        let session_id = request.session_id.as_str();
        let mut sections = Vec::new();

        match memory.get_session(session_id).await {
            Ok(Some(session)) if !session.summary.is_empty() => {
                sections.push(format!("## Conversation Summary\n{}", session.summary));
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, session = %session_id, "failed to load session summary"),
        }

        if self.max_relevant_turns > 0 {
            match memory
                .search_turns(session_id, &request.query, self.max_relevant_turns)
                .await
            {
                Ok(turns) if !turns.is_empty() => {
                    sections.push(render::format_relevant_turns(&turns, Utc::now()));
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, session = %session_id, "failed to search turns"),
            }
        }

        if self.max_recent_turns > 0 {
            match memory.recent_turns(session_id, self.max_recent_turns).await {
                Ok(turns) if !turns.is_empty() => {
                    sections.push(render::format_recent_turns(&turns));
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, session = %session_id, "failed to get recent turns"),
            }
        }

        if self.max_facts > 0 {
            match memory.search_facts(&request.query, self.max_facts).await {
                Ok(facts) if !facts.is_empty() => {
                    sections.push(render::format_known_facts(&facts));
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "failed to search facts"),
            }
        }

        sections
    }
}

#[async_trait]
impl ContextAssembler for DefaultContextAssembler {
    async fn build(&self, request: &Request, tools: &[ToolDef]) -> Result<String> {
        let mut sections = Vec::new();

        let system = self.system_section(request).await;
        if !system.is_empty() {
            sections.push(system);
        }

        if let Some(ref memory) = self.memory {
            sections.extend(self.memory_sections(memory.as_ref(), request).await);
        }

        let tool_text = render::format_tools(tools);
        if !tool_text.is_empty() {
            sections.push(format!("## Available Tools\n{tool_text}"));
        }

        sections.push(format!("## Current Request\n{}", request.query));

        debug!(sections = sections.len(), tools = tools.len(), "assembled context");
        Ok(sections.join("\n\n"))
    }

    async fn append_observations(
        &self,
        prompt: &str,
        observations: &[Observation],
    ) -> Result<String> {
        if observations.is_empty() {
            return Ok(prompt.to_string());
        }
        let mut out = String::with_capacity(prompt.len() + 64 * observations.len());
        out.push_str(prompt);
        out.push_str(&render::format_observations(observations));
        Ok(out)
    }
}
