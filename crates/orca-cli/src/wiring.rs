use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use orca_config::{ContextConfig, LlmConfig, OrcaConfig, ToolsConfig};
use orca_context::{DEFAULT_SYSTEM_PROMPT, DefaultContextAssembler};
use orca_core::{LlmClient, OrcaError, Planner, Result};
use orca_llm::{GeminiProvider, OpenAiProvider, ProviderRouter};
use orca_memory::{MemoryAdapter, MemoryBackend, SqliteMemory};
use orca_runtime::{Engine, HeuristicPlanner, ModelPlanner};
use orca_tools::{KvStoreTool, LocalToolCatalog, RemoteToolService};

/// A fully wired engine plus the catalog it dispatches through.
pub struct Runtime {
    pub engine: Engine,
    pub tools: Arc<LocalToolCatalog>,
}

/// Register every provider that has credentials configured.
pub fn build_llm(config: &LlmConfig) -> ProviderRouter {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let mut router =
        ProviderRouter::new().with_generation(config.temperature, config.max_tokens);

    if let Some(key) = config.openai_api_key.as_deref().filter(|k| !k.is_empty()) {
        router.add_provider(Arc::new(
            OpenAiProvider::new(key)
                .with_base_url(&config.openai_base_url, "openai")
                .with_timeout(timeout),
        ));
    }
    if let Some(key) = config.gemini_api_key.as_deref().filter(|k| !k.is_empty()) {
        router.add_provider(Arc::new(
            GeminiProvider::new(key)
                .with_base_url(&config.gemini_base_url)
                .with_timeout(timeout),
        ));
    }

    if let Some(ref provider) = config.default_provider {
        router = router.with_default_provider(provider.clone());
    }
    if let Some(ref model) = config.default_model {
        router = router.with_default_model(model.clone());
    }
    if router.provider_names().is_empty() {
        warn!("no LLM provider configured, direct answers will fail");
    }
    router
}

/// The built-in store, backed by the remote tool service when one is set.
pub fn build_tools(config: &ToolsConfig) -> LocalToolCatalog {
    let catalog = LocalToolCatalog::new().with_handler(Arc::new(KvStoreTool::new()));

    match config.remote_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => {
            let mut remote = RemoteToolService::new(url)
                .with_timeout(Duration::from_secs(config.request_timeout_secs));
            if let Some(ref token) = config.auth_token {
                remote = remote.with_auth_token(token.clone());
            }
            info!(url = %remote.base_url(), "remote tools enabled");
            catalog.with_fallback(Arc::new(remote))
        }
        None => catalog,
    }
}

/// `system_prompt_file` wins over `system_prompt`; neither means the default.
pub fn load_system_prompt(config: &ContextConfig) -> Result<String> {
    if let Some(ref path) = config.system_prompt_file {
        return std::fs::read_to_string(path).map_err(|e| {
            OrcaError::Config(format!(
                "failed to read system prompt {}: {e}",
                path.display()
            ))
        });
    }
    Ok(config
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()))
}

fn build_planner(config: &OrcaConfig, llm: Arc<dyn LlmClient>) -> Result<Arc<dyn Planner>> {
    match config.planner.kind.as_str() {
        "heuristic" => Ok(Arc::new(HeuristicPlanner::from_config(&config.planner))),
        "model" => Ok(Arc::new(ModelPlanner::new(llm))),
        other => Err(OrcaError::Config(format!("unknown planner kind: {other}"))),
    }
}

pub fn build_runtime(config: &OrcaConfig) -> Result<Runtime> {
    let llm: Arc<dyn LlmClient> = Arc::new(build_llm(&config.llm));
    let planner = build_planner(config, Arc::clone(&llm))?;
    let tools = Arc::new(build_tools(&config.tools));

    let mut context = DefaultContextAssembler::new()
        .with_system_prompt(load_system_prompt(&config.context)?)
        .with_turn_limits(
            config.memory.max_relevant_turns,
            config.memory.max_recent_turns,
        )
        .with_fact_limit(config.memory.max_facts);

    let mut builder = Engine::builder()
        .planner(planner)
        .llm(llm)
        .tools(tools.clone())
        .executor(tools.clone())
        .policy(orca_policy::from_config(&config.policy))
        .config(&config.engine);

    if config.memory.enabled {
        let backend: Arc<dyn MemoryBackend> =
            Arc::new(SqliteMemory::open(&config.memory.resolved_db_path())?);
        context = context.with_memory(Arc::clone(&backend));

        let mut adapter = MemoryAdapter::new(backend);
        if config.memory.compression_age_secs > 0 {
            adapter = adapter
                .with_compression(Duration::from_secs(config.memory.compression_age_secs));
        }
        builder = builder.memory(Arc::new(adapter));
    }

    let engine = builder.context(Arc::new(context)).build()?;
    info!(
        planner = %config.planner.kind,
        max_steps = engine.max_steps(),
        memory = config.memory.enabled,
        "engine ready"
    );
    Ok(Runtime { engine, tools })
}
