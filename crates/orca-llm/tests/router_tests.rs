#[cfg(test)]
mod tests {
    use orca_core::{HistoryMessage, LlmClient, LlmRequest, OrcaError, Role};
    use orca_llm::{MockProvider, ProviderRouter};
    use std::sync::Arc;
    use std::time::Duration;

    fn make_request(provider: Option<&str>, model: Option<&str>) -> LlmRequest {
        LlmRequest {
            query: "What changed?".into(),
            prompt: "## Current Request\nWhat changed?".into(),
            observations: vec![],
            history: vec![
                HistoryMessage::user("earlier question"),
                HistoryMessage::assistant("earlier answer"),
            ],
            provider: provider.map(String::from),
            model: model.map(String::from),
        }
    }

    fn fast(router: ProviderRouter) -> ProviderRouter {
        router.with_retry_delay(Duration::from_millis(1))
    }

    // ── Provider selection ─────────────────────────────────────

    #[tokio::test]
    async fn test_explicit_provider_wins() {
        let a = Arc::new(MockProvider::new("gemini").with_response("from gemini"));
        let b = Arc::new(MockProvider::new("openai").with_response("from openai"));
        let router = ProviderRouter::new()
            .with_provider(a)
            .with_provider(b)
            .with_default_provider("gemini");

        let resp = router.respond(&make_request(Some("openai"), None)).await.unwrap();
        assert_eq!(resp.text, "from openai");
        assert_eq!(resp.provider, "openai");
    }

    #[tokio::test]
    async fn test_unknown_explicit_provider_errors() {
        let router = ProviderRouter::new().with_provider(Arc::new(MockProvider::new("gemini")));
        let err = router
            .respond(&make_request(Some("anthropic"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, OrcaError::ProviderNotConfigured(ref n) if n == "anthropic"));
    }

    #[tokio::test]
    async fn test_default_provider_then_first() {
        let a = Arc::new(MockProvider::new("first").with_response("a"));
        let b = Arc::new(MockProvider::new("second").with_response("b"));
        let router = ProviderRouter::new()
            .with_provider(a.clone())
            .with_provider(b.clone())
            .with_default_provider("second");
        assert_eq!(router.respond(&make_request(None, None)).await.unwrap().text, "b");

        let router = ProviderRouter::new().with_provider(a).with_provider(b);
        assert_eq!(router.respond(&make_request(None, None)).await.unwrap().text, "a");
    }

    #[tokio::test]
    async fn test_no_providers() {
        let router = ProviderRouter::new();
        let err = router.respond(&make_request(None, None)).await.unwrap_err();
        assert!(err.to_string().contains("no LLM provider configured"));
    }

    // ── Request shaping ────────────────────────────────────────

    #[tokio::test]
    async fn test_prompt_history_and_query_forwarded() {
        let p = Arc::new(MockProvider::new("openai").with_response("ok"));
        let recorded = p.recorded_requests();
        let router = ProviderRouter::new().with_provider(p).with_generation(0.2, 512);
        router.respond(&make_request(None, None)).await.unwrap();

        let reqs = recorded.lock();
        let req = &reqs[0];
        assert_eq!(req.system, "## Current Request\nWhat changed?");
        assert_eq!(req.messages.len(), 3);
        assert_eq!(req.messages[1].role, Role::Assistant);
        assert_eq!(req.messages[2].content, "What changed?");
        assert_eq!(req.max_tokens, 512);
        assert_eq!(req.temperature, 0.2);
    }

    #[tokio::test]
    async fn test_model_selection() {
        let p = Arc::new(
            MockProvider::new("openai")
                .with_response("1")
                .with_response("2")
                .with_response("3"),
        );
        let recorded = p.recorded_requests();
        let router = ProviderRouter::new()
            .with_provider(p)
            .with_default_provider("openai")
            .with_default_model("gpt-4o");

        let r1 = router.respond(&make_request(None, Some("gpt-4.1"))).await.unwrap();
        let r2 = router.respond(&make_request(None, None)).await.unwrap();
        assert_eq!(r1.model, "gpt-4.1");
        assert_eq!(r2.model, "gpt-4o");

        let router = ProviderRouter::new().with_provider(Arc::new(MockProvider::new("x").with_response("3")));
        let r3 = router.respond(&make_request(None, None)).await.unwrap();
        assert_eq!(r3.model, "mock-model");
        assert_eq!(recorded.lock().len(), 2);
    }

    // ── Retry logic ────────────────────────────────────────────

    #[tokio::test]
    async fn test_retry_on_transient_error() {
        let p = Arc::new(
            MockProvider::new("openai")
                .with_error("HTTP 429: rate limited")
                .with_response("success after retry"),
        );
        let recorded = p.recorded_requests();
        let router = fast(ProviderRouter::new().with_provider(p));
        let resp = router.respond(&make_request(None, None)).await.unwrap();
        assert_eq!(resp.text, "success after retry");
        assert_eq!(recorded.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_no_retry_on_permanent_error() {
        let p = Arc::new(
            MockProvider::new("openai")
                .with_error("HTTP 401: bad key")
                .with_response("never"),
        );
        let recorded = p.recorded_requests();
        let router = fast(ProviderRouter::new().with_provider(p));
        let err = router.respond(&make_request(None, None)).await.unwrap_err();
        assert!(err.to_string().contains("401"));
        assert_eq!(recorded.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let p = Arc::new(
            MockProvider::new("openai")
                .with_error("HTTP 503: down")
                .with_error("HTTP 503: down")
                .with_error("HTTP 503: down")
                .with_error("HTTP 503: down"),
        );
        let recorded = p.recorded_requests();
        let router = fast(ProviderRouter::new().with_provider(p));
        assert!(router.respond(&make_request(None, None)).await.is_err());
        assert_eq!(recorded.lock().len(), 4);
    }
}
