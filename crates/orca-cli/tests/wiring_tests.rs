#[cfg(test)]
mod tests {
    use orca_cli::{build_llm, build_runtime, build_tools, load_system_prompt};
    use orca_config::{ContextConfig, LlmConfig, OrcaConfig, ToolsConfig};
    use orca_context::DEFAULT_SYSTEM_PROMPT;
    use orca_core::{OrcaError, Request, ToolCall, ToolExecutor, ToolRegistry};

    fn offline_config() -> OrcaConfig {
        let mut config = OrcaConfig::default();
        config.memory.enabled = false;
        config
    }

    // ── LLM providers ──────────────────────────────────────────

    #[test]
    fn test_providers_follow_configured_keys() {
        assert!(build_llm(&LlmConfig::default()).provider_names().is_empty());

        let config = LlmConfig {
            openai_api_key: Some("sk-test".into()),
            gemini_api_key: Some(String::new()),
            ..LlmConfig::default()
        };
        assert_eq!(build_llm(&config).provider_names(), vec!["openai"]);

        let config = LlmConfig {
            openai_api_key: Some("sk-test".into()),
            gemini_api_key: Some("g-test".into()),
            ..LlmConfig::default()
        };
        assert_eq!(build_llm(&config).provider_names().len(), 2);
    }

    // ── Tools ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_local_tools_without_remote() {
        let catalog = build_tools(&ToolsConfig::default());
        let tools = catalog.list_tools("", "").await.unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["store"]);

        let put = ToolCall::new("store", "kv_put")
            .with_arg("key", "k")
            .with_arg("value", "v");
        assert!(catalog.execute(&put).await.unwrap().success);
    }

    #[tokio::test]
    async fn test_unreachable_remote_keeps_local_tools() {
        let config = ToolsConfig {
            remote_url: Some("http://127.0.0.1:1".into()),
            request_timeout_secs: 1,
            ..ToolsConfig::default()
        };
        // Listing still yields the local store when the remote is down.
        let tools = build_tools(&config).list_tools("u", "p").await.unwrap();
        assert!(tools.iter().any(|t| t.name == "store"));
    }

    // ── System prompt ──────────────────────────────────────────

    #[test]
    fn test_system_prompt_resolution() {
        assert_eq!(
            load_system_prompt(&ContextConfig::default()).unwrap(),
            DEFAULT_SYSTEM_PROMPT
        );

        let inline = ContextConfig {
            system_prompt: Some("Be brief.".into()),
            system_prompt_file: None,
        };
        assert_eq!(load_system_prompt(&inline).unwrap(), "Be brief.");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "From file.").unwrap();
        let from_file = ContextConfig {
            system_prompt: Some("ignored".into()),
            system_prompt_file: Some(path),
        };
        assert_eq!(load_system_prompt(&from_file).unwrap(), "From file.");
    }

    #[test]
    fn test_missing_prompt_file_is_config_error() {
        let config = ContextConfig {
            system_prompt: None,
            system_prompt_file: Some("/nonexistent/orca/prompt.md".into()),
        };
        assert!(matches!(
            load_system_prompt(&config),
            Err(OrcaError::Config(_))
        ));
    }

    // ── Runtime ────────────────────────────────────────────────

    #[test]
    fn test_runtime_uses_engine_config() {
        let mut config = offline_config();
        config.engine.max_steps = 7;
        let runtime = build_runtime(&config).unwrap();
        assert_eq!(runtime.engine.max_steps(), 7);
    }

    #[test]
    fn test_unknown_planner_kind_rejected() {
        let mut config = offline_config();
        config.planner.kind = "oracle".into();
        let err = build_runtime(&config).err().unwrap();
        assert!(err.to_string().contains("unknown planner kind: oracle"));
    }

    #[test]
    fn test_model_planner_kind_builds() {
        let mut config = offline_config();
        config.planner.kind = "model".into();
        assert!(build_runtime(&config).is_ok());
    }

    #[tokio::test]
    async fn test_sqlite_memory_opened_and_answer_needs_provider() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = OrcaConfig::default();
        config.memory.db_path = Some(dir.path().join("nested").join("memory.db"));
        let runtime = build_runtime(&config).unwrap();
        assert!(dir.path().join("nested").join("memory.db").exists());

        // The store call is rejected locally (no key), then the answer step
        // needs a provider and none is configured.
        let request = Request::new("tool:store.kv_get").with_session("s1");
        let err = runtime.engine.run(request).await.unwrap_err();
        assert!(matches!(err, OrcaError::ProviderNotConfigured(_)));
    }

    #[test]
    fn test_memory_compression_settings_build() {
        let dir = tempfile::tempdir().unwrap();
        for age in [0, 600, orca_config::schema::MAX_COMPRESSION_AGE_SECS] {
            let mut config = OrcaConfig::default();
            config.memory.db_path = Some(dir.path().join(format!("memory-{age}.db")));
            config.memory.compression_age_secs = age;
            config.memory.max_facts = 0;
            assert!(build_runtime(&config).is_ok(), "age {age}");
        }
    }

    #[tokio::test]
    async fn test_clarification_answers_without_provider() {
        let runtime = build_runtime(&offline_config()).unwrap();
        let response = runtime
            .engine
            .run(Request::new("tool:nothing"))
            .await
            .unwrap();
        assert!(response.text.starts_with("Which tool and action should I use?"));
        assert!(response.observations.is_empty());
    }
}
