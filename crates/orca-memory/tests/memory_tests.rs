#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use orca_core::{MemoryStore, Observation, Role, ToolResult};
    use orca_memory::*;
    use serde_json::json;
    use std::sync::Arc;

    fn turn_at(session: &str, role: Role, content: &str, mins_ago: i64) -> Turn {
        Turn::new(session, role, content, Utc::now() - Duration::minutes(mins_ago))
    }

    // ── Keyword tests ──────────────────────────────────────────

    #[test]
    fn test_extract_keywords_drops_stop_words() {
        let kw = extract_keywords("What is the status of the deploy for OPS-42?");
        assert!(kw.contains(&"status".to_string()));
        assert!(kw.contains(&"deploy".to_string()));
        assert!(kw.contains(&"ops-42".to_string()));
        assert!(!kw.contains(&"the".to_string()));
        assert!(!kw.contains(&"what".to_string()));
    }

    #[test]
    fn test_extract_keywords_dedupes_and_trims_dots() {
        let kw = extract_keywords("Deploy. deploy api.v2 deploy.");
        assert_eq!(kw, vec!["deploy", "api.v2"]);
    }

    // ── Turn tests ─────────────────────────────────────────────

    #[tokio::test]
    async fn test_add_and_recent_turns_oldest_first() {
        let mem = SqliteMemory::open_in_memory().unwrap();
        mem.add_turn(&turn_at("s1", Role::User, "first", 3)).await.unwrap();
        mem.add_turn(&turn_at("s1", Role::Assistant, "second", 2)).await.unwrap();
        mem.add_turn(&turn_at("s1", Role::User, "third", 1)).await.unwrap();
        mem.add_turn(&turn_at("s2", Role::User, "other session", 1)).await.unwrap();

        let recent = mem.recent_turns("s1", 2).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "third"]);
        assert_eq!(recent[0].role, Role::Assistant);
        assert_eq!(mem.turn_count("s1").unwrap(), 3);
    }

    #[tokio::test]
    async fn test_add_turn_tracks_session() {
        let mem = SqliteMemory::open_in_memory().unwrap();
        assert!(mem.get_session("s1").await.unwrap().is_none());
        mem.add_turn(&turn_at("s1", Role::User, "hi", 0)).await.unwrap();
        mem.add_turn(&turn_at("s1", Role::Assistant, "hello", 0)).await.unwrap();
        let session = mem.get_session("s1").await.unwrap().unwrap();
        assert_eq!(session.turn_count, 2);
        assert!(session.summary.is_empty());
    }

    #[tokio::test]
    async fn test_recent_turns_zero_limit() {
        let mem = SqliteMemory::open_in_memory().unwrap();
        mem.add_turn(&turn_at("s1", Role::User, "hi", 0)).await.unwrap();
        assert!(mem.recent_turns("s1", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_turns_ranks_by_overlap() {
        let mem = SqliteMemory::open_in_memory().unwrap();
        mem.add_turn(&turn_at("s1", Role::User, "the deploy pipeline is red", 5)).await.unwrap();
        mem.add_turn(&turn_at("s1", Role::User, "lunch plans", 4)).await.unwrap();
        mem.add_turn(&turn_at("s1", Role::User, "deploy pipeline for billing is red again", 3))
            .await
            .unwrap();

        let hits = mem.search_turns("s1", "billing deploy pipeline", 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].content.contains("billing"));
        assert!(hits.iter().all(|t| !t.content.contains("lunch")));
    }

    #[tokio::test]
    async fn test_search_turns_stop_words_only() {
        let mem = SqliteMemory::open_in_memory().unwrap();
        mem.add_turn(&turn_at("s1", Role::User, "the thing", 1)).await.unwrap();
        assert!(mem.search_turns("s1", "what is the", 5).await.unwrap().is_empty());
    }

    // ── Compression tests ──────────────────────────────────────

    #[tokio::test]
    async fn test_compress_turns_marks_only_old() {
        let mem = SqliteMemory::open_in_memory().unwrap();
        let long = "x".repeat(250);
        mem.add_turn(&turn_at("s1", Role::User, &long, 30)).await.unwrap();
        mem.add_turn(&turn_at("s1", Role::User, "fresh", 1)).await.unwrap();

        let compressed = mem.compress_turns("s1", Duration::minutes(10)).await.unwrap();
        assert_eq!(compressed.len(), 1);
        assert!(compressed[0].compressed);
        assert_eq!(compressed[0].summary.chars().count(), 203);

        // Already compressed turns are not returned again
        assert!(mem.compress_turns("s1", Duration::minutes(10)).await.unwrap().is_empty());

        let recent = mem.recent_turns("s1", 5).await.unwrap();
        assert!(recent[0].compressed);
        assert!(recent[0].display_content().ends_with("..."));
        assert_eq!(recent[1].display_content(), "fresh");
    }

    #[tokio::test]
    async fn test_compressor_appends_to_summary() {
        let mem: Arc<dyn MemoryBackend> = Arc::new(SqliteMemory::open_in_memory().unwrap());
        mem.add_turn(&turn_at("s1", Role::User, "Deploy billing. Then check logs.", 20))
            .await
            .unwrap();
        mem.add_turn(&turn_at("s1", Role::Assistant, "Done", 19)).await.unwrap();

        let compressor = SessionCompressor::new(Arc::clone(&mem), Duration::minutes(10));
        assert_eq!(compressor.compress_session("s1").await.unwrap(), 2);

        let session = mem.get_session("s1").await.unwrap().unwrap();
        assert_eq!(session.summary, "- user: Deploy billing.\n- assistant: Done");
        assert_eq!(compressor.compress_session("s1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_compress_turns_age_beyond_time_range() {
        let mem = SqliteMemory::open_in_memory().unwrap();
        mem.add_turn(&turn_at("s1", Role::User, "ancient", 60)).await.unwrap();

        let compressed = mem
            .compress_turns("s1", Duration::seconds(9_000_000_000_000))
            .await
            .unwrap();
        assert!(compressed.is_empty());
        assert!(!mem.recent_turns("s1", 1).await.unwrap()[0].compressed);
    }

    // ── Fact tests ─────────────────────────────────────────────

    #[tokio::test]
    async fn test_store_and_query_facts() {
        let mem = SqliteMemory::open_in_memory().unwrap();
        mem.store_fact(&Fact::new("store", "s1", "tool_observation", r#"{"items":["billing"]}"#, "store"))
            .await
            .unwrap();
        mem.store_fact(&Fact::new("app/jira", "s1", "tool_observation", r#"{"issue":"OPS-1"}"#, "app/jira"))
            .await
            .unwrap();

        let hits = mem.search_facts("billing items", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity_id, "store");
        assert_eq!(hits[0].fact_type, "tool_observation");

        // The entity id is searchable too
        let hits = mem.search_facts("open jira", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity_id, "app/jira");

        assert!(mem.search_facts("billing", 0).await.unwrap().is_empty());
        assert!(mem.search_facts("the and", 10).await.unwrap().is_empty());
    }

    // ── Adapter tests ──────────────────────────────────────────

    #[tokio::test]
    async fn test_adapter_records_turns() {
        let backend = Arc::new(SqliteMemory::open_in_memory().unwrap());
        let adapter = MemoryAdapter::new(backend.clone());
        adapter.add_turn("s1", Role::User, "q", Utc::now()).await.unwrap();
        adapter.add_turn("s1", Role::Assistant, "a", Utc::now()).await.unwrap();
        assert_eq!(backend.turn_count("s1").unwrap(), 2);
    }

    #[tokio::test]
    async fn test_adapter_stores_result_as_json_fact() {
        let backend = Arc::new(SqliteMemory::open_in_memory().unwrap());
        let adapter = MemoryAdapter::new(backend.clone());
        let mut data = serde_json::Map::new();
        data.insert("count".into(), json!(2));
        let obs = Observation::success("store", ToolResult::ok(data).with_message("ok"));
        adapter.store_fact("s1", &obs).await.unwrap();

        let facts = backend.search_facts("count", 5).await.unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].source, "store");
        assert_eq!(facts[0].session_id, "s1");
        let parsed: serde_json::Value = serde_json::from_str(&facts[0].content).unwrap();
        assert_eq!(parsed["data"]["count"], 2);
        assert_eq!(parsed["success"], true);
    }

    #[tokio::test]
    async fn test_adapter_skips_error_observations() {
        let backend = Arc::new(SqliteMemory::open_in_memory().unwrap());
        let adapter = MemoryAdapter::new(backend.clone());
        adapter
            .store_fact("s1", &Observation::failure("store", "boom"))
            .await
            .unwrap();
        assert!(backend.search_facts("store boom", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adapter_compresses_after_assistant_turn() {
        let backend = Arc::new(SqliteMemory::open_in_memory().unwrap());
        let adapter = MemoryAdapter::new(backend.clone())
            .with_compression(std::time::Duration::from_secs(600));
        adapter
            .add_turn("s1", Role::User, "old question.", Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        adapter.add_turn("s1", Role::Assistant, "new answer", Utc::now()).await.unwrap();

        let session = backend.get_session("s1").await.unwrap().unwrap();
        assert_eq!(session.summary, "- user: old question.");
    }

    #[tokio::test]
    async fn test_adapter_huge_compression_age_compresses_nothing() {
        // Past the representable date range, then past the duration range.
        for secs in [9_000_000_000_000, 10_000_000_000_000] {
            let backend = Arc::new(SqliteMemory::open_in_memory().unwrap());
            let adapter = MemoryAdapter::new(backend.clone())
                .with_compression(std::time::Duration::from_secs(secs));
            adapter
                .add_turn("s1", Role::User, "old question.", Utc::now() - Duration::hours(1))
                .await
                .unwrap();
            adapter.add_turn("s1", Role::Assistant, "new answer", Utc::now()).await.unwrap();

            let session = backend.get_session("s1").await.unwrap().unwrap();
            assert!(session.summary.is_empty());
            assert_eq!(backend.turn_count("s1").unwrap(), 2);
        }
    }

    // ── Persistence tests ──────────────────────────────────────

    #[tokio::test]
    async fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("memory.db");
        {
            let mem = SqliteMemory::open(&path).unwrap();
            mem.add_turn(&turn_at("s1", Role::User, "remember me", 0)).await.unwrap();
        }
        let mem = SqliteMemory::open(&path).unwrap();
        let recent = mem.recent_turns("s1", 3).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "remember me");
    }
}
