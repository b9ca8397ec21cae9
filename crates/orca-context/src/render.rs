use chrono::{DateTime, Utc};

use orca_core::{Observation, ObservationOutcome, Role, ToolDef, truncate_chars};
use orca_memory::{Fact, Turn};

/// Readable tool catalog: one `### name` block per tool with its actions.
pub fn format_tools(tools: &[ToolDef]) -> String {
    let mut out = String::new();
    for t in tools {
        out.push_str(&format!("### {}\n{}\n", t.name, t.description));
        if !t.actions.is_empty() {
            out.push_str("Actions:\n");
            for a in &t.actions {
                out.push_str(&format!("- {}: {}", a.name, a.description));
                if !a.input_schema.is_empty() {
                    out.push_str(&format!(" Schema: {}", a.input_schema));
                }
                out.push('\n');
            }
        }
        out.push('\n');
    }
    out.trim().to_string()
}

pub fn format_time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(at);
    if diff.num_minutes() < 1 {
        "just now".into()
    } else if diff.num_hours() < 1 {
        format!("{} mins ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{} hrs ago", diff.num_hours())
    } else {
        format!("{} days ago", diff.num_days())
    }
}

pub fn format_relevant_turns(turns: &[Turn], now: DateTime<Utc>) -> String {
    let mut lines = vec!["## Relevant Context (from earlier in conversation)".to_string()];
    for t in turns {
        lines.push(format!(
            "- [{}] {}: {}",
            format_time_ago(t.created_at, now),
            t.role,
            truncate_chars(t.display_content(), 200)
        ));
    }
    lines.join("\n")
}

pub fn format_recent_turns(turns: &[Turn]) -> String {
    let mut lines = vec!["## Recent Conversation".to_string()];
    for t in turns {
        let who = match t.role {
            Role::Assistant => "Assistant",
            _ => "User",
        };
        lines.push(format!("{who}: {}", t.display_content()));
    }
    lines.join("\n")
}

/// Stored tool results, tagged with the tool that produced them.
pub fn format_known_facts(facts: &[Fact]) -> String {
    let mut lines = vec!["## Known Facts".to_string()];
    for f in facts {
        lines.push(format!("- [{}] {}", f.entity_id, truncate_chars(&f.content, 200)));
    }
    lines.join("\n")
}

/// The `## Tool Observations` block, starting with its blank-line separator.
pub fn format_observations(observations: &[Observation]) -> String {
    let mut out = String::from("\n\n## Tool Observations\n");
    for obs in observations {
        match &obs.outcome {
            ObservationOutcome::Error(e) => {
                out.push_str(&format!("- {}: error={}\n", obs.tool_name, e));
            }
            ObservationOutcome::Result(r) => {
                let payload = serde_json::to_string(&r.data).unwrap_or_else(|_| "{}".into());
                out.push_str(&format!("- {}: {}\n", obs.tool_name, payload));
                if !r.message.is_empty() {
                    out.push_str(&format!("  message: {}\n", r.message));
                }
            }
        }
    }
    out
}
