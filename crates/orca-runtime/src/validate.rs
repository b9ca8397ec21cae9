use orca_core::{ToolCall, ToolDef};

/// Check a call against the catalog before it is dispatched.
///
/// The error text is what the run records as the call's observation.
pub fn validate_call(call: &ToolCall, tools: &[ToolDef]) -> Result<(), String> {
    if call.name.is_empty() {
        return Err("missing tool name".into());
    }
    let Some(tool) = tools.iter().find(|t| t.name == call.name) else {
        return Err(format!("unknown tool: {}", call.name));
    };
    if call.action.is_empty() {
        return Err("missing tool action".into());
    }
    let Some(action) = tool.action(&call.action) else {
        return Err(format!("unknown action: {}", call.action));
    };

    let missing: Vec<String> = action
        .required_params()
        .into_iter()
        .filter(|key| !call.args.contains_key(key))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("missing required params: {}", missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orca_core::ToolAction;

    fn catalog() -> Vec<ToolDef> {
        vec![
            ToolDef::new("app/jira", "Jira")
                .with_action(
                    ToolAction::new("create", "")
                        .with_schema(r#"{"type":"object","required":["project","summary","type"]}"#),
                )
                .with_action(ToolAction::new("search", "")),
        ]
    }

    #[test]
    fn test_valid_call() {
        let call = ToolCall::new("app/jira", "search");
        assert_eq!(validate_call(&call, &catalog()), Ok(()));
    }

    #[test]
    fn test_rejections() {
        let tools = catalog();
        assert_eq!(
            validate_call(&ToolCall::new("", "search"), &tools).unwrap_err(),
            "missing tool name"
        );
        assert_eq!(
            validate_call(&ToolCall::new("github", "search"), &tools).unwrap_err(),
            "unknown tool: github"
        );
        assert_eq!(
            validate_call(&ToolCall::new("app/jira", ""), &tools).unwrap_err(),
            "missing tool action"
        );
        assert_eq!(
            validate_call(&ToolCall::new("app/jira", "delete"), &tools).unwrap_err(),
            "unknown action: delete"
        );
    }

    #[test]
    fn test_missing_params_in_schema_order() {
        let call = ToolCall::new("app/jira", "create").with_arg("summary", "x");
        assert_eq!(
            validate_call(&call, &catalog()).unwrap_err(),
            "missing required params: project, type"
        );
    }

    #[test]
    fn test_null_value_counts_as_present() {
        let call = ToolCall::new("app/jira", "create")
            .with_arg("project", serde_json::Value::Null)
            .with_arg("summary", "x")
            .with_arg("type", "bug");
        assert!(validate_call(&call, &catalog()).is_ok());
    }
}
