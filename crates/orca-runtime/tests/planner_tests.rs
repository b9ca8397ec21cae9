#[cfg(test)]
mod tests {
    use orca_core::{
        Observation, Plan, PlanInput, Planner, Request, ToolAction, ToolCall, ToolDef,
    };
    use orca_runtime::HeuristicPlanner;

    fn tool(name: &str, actions: &[&str]) -> ToolDef {
        actions.iter().fold(ToolDef::new(name, ""), |def, a| {
            def.with_action(ToolAction::new(*a, ""))
        })
    }

    fn input(query: &str, tools: Vec<ToolDef>) -> PlanInput {
        PlanInput {
            request: Request::new(query).with_scope("user-1", "project-1"),
            prompt: String::new(),
            tools,
            observations: vec![],
            step: 1,
        }
    }

    async fn single_call(planner: &HeuristicPlanner, input: &PlanInput) -> ToolCall {
        match planner.plan(input).await.unwrap() {
            Plan::ToolCalls { mut calls } => {
                assert_eq!(calls.len(), 1);
                calls.remove(0)
            }
            other => panic!("expected tool calls, got {other:?}"),
        }
    }

    // ── Determinism ────────────────────────────────────────────

    #[tokio::test]
    async fn test_determinism() {
        let planner = HeuristicPlanner::new();
        let input = input("tool:app/jira.search", vec![tool("app/jira", &["search"])]);
        let a = planner.plan(&input).await.unwrap();
        let b = planner.plan(&input).await.unwrap();
        assert_eq!(a, b);
    }

    // ── Explicit markers ───────────────────────────────────────

    #[tokio::test]
    async fn test_marker_name_dot_action() {
        let planner = HeuristicPlanner::new();
        let call = single_call(
            &planner,
            &input("please run tool:app/jira.search now", vec![tool("app/jira", &["search"])]),
        )
        .await;
        assert_eq!(call.name, "app/jira");
        assert_eq!(call.action, "search");
        assert_eq!(call.args["query"], "please run tool:app/jira.search now");
        assert_eq!(call.args["userId"], "user-1");
        assert_eq!(call.args["projectId"], "project-1");
    }

    #[tokio::test]
    async fn test_marker_slash_action() {
        let planner = HeuristicPlanner::new();
        let call = single_call(&planner, &input("tool:app/jira/create", vec![])).await;
        assert_eq!(call.name, "app/jira");
        assert_eq!(call.action, "create");
    }

    #[tokio::test]
    async fn test_marker_two_segment_slash_action() {
        let planner = HeuristicPlanner::new();
        let tools = vec![tool("github", &["open_pr", "list"]), tool("app/jira", &["create", "search"])];

        let call = single_call(&planner, &input("tool:github/list", tools.clone())).await;
        assert_eq!(call.name, "github");
        assert_eq!(call.action, "list");

        // A namespaced tool name still wins over the split.
        let call = single_call(&planner, &input("tool:app/jira", tools.clone())).await;
        assert_eq!(call.name, "app/jira");
        assert_eq!(call.action, "search");

        // Unknown action on a known tool is not split.
        let plan = planner.plan(&input("tool:github/merge", tools)).await.unwrap();
        assert!(matches!(plan, Plan::NeedClarification { .. }), "{plan:?}");
    }

    #[tokio::test]
    async fn test_marker_is_case_insensitive_and_keeps_name_case() {
        let planner = HeuristicPlanner::new();
        let call = single_call(&planner, &input("TOOL:Store.kv_get", vec![])).await;
        assert_eq!(call.name, "Store");
        assert_eq!(call.action, "kv_get");
    }

    #[tokio::test]
    async fn test_marker_bare_name_infers_action() {
        let planner = HeuristicPlanner::new();
        let tools = vec![tool("store", &["kv_get", "list"]), tool("github", &["open_pr"])];
        let call = single_call(&planner, &input("tool:store", tools.clone())).await;
        assert_eq!(call.action, "list");
        let call = single_call(&planner, &input("tool:github", tools)).await;
        assert_eq!(call.action, "open_pr");
    }

    #[tokio::test]
    async fn test_unresolvable_marker_asks_for_clarification() {
        let planner = HeuristicPlanner::new();
        for query in ["tool:", "tool:nothing", "tool:app/jira"] {
            let plan = planner.plan(&input(query, vec![])).await.unwrap();
            assert_eq!(
                plan,
                Plan::clarify("Which tool and action should I use? Example: tool:app/jira.search"),
                "query: {query}"
            );
        }
    }

    // ── Keyword and fallback selection ─────────────────────────

    #[tokio::test]
    async fn test_keyword_matches_tool_name() {
        let planner = HeuristicPlanner::new();
        let tools = vec![
            tool("app/slack", &["post"]),
            tool("app/pagerduty", &["ack", "list"]),
        ];
        let call = single_call(&planner, &input("any open Incident on pagerduty?", tools)).await;
        assert_eq!(call.name, "app/pagerduty");
        assert_eq!(call.action, "list");
    }

    #[tokio::test]
    async fn test_custom_keywords() {
        let planner = HeuristicPlanner::new().with_keywords(&["deploy"]);
        let tools = vec![tool("ci/deploy", &["trigger"]), tool("app/jira", &["search"])];
        let call = single_call(&planner, &input("deploy the api", tools)).await;
        assert_eq!(call.name, "ci/deploy");
        assert_eq!(call.action, "trigger");
    }

    #[tokio::test]
    async fn test_fallback_to_first_search_tool() {
        let planner = HeuristicPlanner::new();
        let tools = vec![tool("notes", &["write"]), tool("docs", &["fetch", "query"])];
        let call = single_call(&planner, &input("what changed yesterday", tools)).await;
        assert_eq!(call.name, "docs");
        assert_eq!(call.action, "query");
    }

    #[tokio::test]
    async fn test_direct_when_nothing_matches() {
        let planner = HeuristicPlanner::new();
        let plan = planner
            .plan(&input("hello", vec![tool("notes", &["write"])]))
            .await
            .unwrap();
        assert_eq!(plan, Plan::Direct);
        assert_eq!(planner.plan(&input("hello", vec![])).await.unwrap(), Plan::Direct);
    }

    #[tokio::test]
    async fn test_direct_once_observations_exist() {
        let planner = HeuristicPlanner::new();
        let mut input = input("tool:app/jira.search", vec![tool("app/jira", &["search"])]);
        input.observations.push(Observation::failure("app/jira", "boom"));
        assert_eq!(planner.plan(&input).await.unwrap(), Plan::Direct);
    }

    #[tokio::test]
    async fn test_scope_args_omitted_when_empty() {
        let planner = HeuristicPlanner::new();
        let mut input = input("tool:a.b", vec![]);
        input.request.user_id.clear();
        input.request.project_id.clear();
        let call = single_call(&planner, &input).await;
        assert_eq!(call.args.len(), 1);
    }
}
