use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use orca_config::{ConfigLoader, LoggingConfig, OrcaConfig};
use orca_core::{Observation, OrcaError, Request, ToolRegistry, Trace, truncate_chars};

use crate::wiring::{build_runtime, build_tools};

const REDACTED: &str = "***";

/// Orca: plan, call tools, answer.
#[derive(Parser)]
#[command(name = "orca", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to orca.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one request through the engine and print the answer
    Ask {
        /// The request text
        #[arg(required = true)]
        query: Vec<String>,

        /// Conversation id used for memory
        #[arg(short, long, default_value = "")]
        session: String,

        #[arg(short, long, default_value = "")]
        user: String,

        #[arg(short, long, default_value = "")]
        project: String,

        /// Provider override, e.g. openai or gemini
        #[arg(long)]
        provider: Option<String>,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Print the run trace after the answer
        #[arg(long)]
        trace: bool,

        /// Print the whole response as JSON
        #[arg(long, conflicts_with = "trace")]
        json: bool,
    },
    /// List the tools visible to a user and project
    Tools {
        #[arg(short, long, default_value = "")]
        user: String,

        #[arg(short, long, default_value = "")]
        project: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration (secrets redacted)
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub async fn run(self) -> orca_core::Result<()> {
        if let Commands::Completions { shell } = self.command {
            generate(shell, &mut Cli::command(), "orca", &mut std::io::stdout());
            return Ok(());
        }

        let loader = ConfigLoader::load(self.config.as_deref())?;
        let config = loader.get();
        init_tracing(&config.logging, self.log_level.as_deref());

        match self.command {
            Commands::Ask {
                query,
                session,
                user,
                project,
                provider,
                model,
                trace,
                json,
            } => {
                let mut request = Request::new(query.join(" "))
                    .with_session(session)
                    .with_scope(user, project);
                request.provider = provider;
                request.model = model;
                Self::cmd_ask(config, request, trace, json).await
            }
            Commands::Tools {
                user,
                project,
                json,
            } => Self::cmd_tools(config, &user, &project, json).await,
            Commands::Config { json } => Self::cmd_config(config, json),
            Commands::Completions { .. } => Ok(()),
        }
    }

    async fn cmd_ask(
        config: OrcaConfig,
        request: Request,
        show_trace: bool,
        json: bool,
    ) -> orca_core::Result<()> {
        let runtime = build_runtime(&config)?;

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling run");
                on_interrupt.cancel();
            }
        });

        let response = runtime.engine.run_with_cancel(request, cancel).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }

        println!("{}", response.text);
        if !response.observations.is_empty() {
            println!();
            println!("Observations:");
            for obs in &response.observations {
                println!("  {}", format_observation(obs));
            }
        }
        if show_trace {
            println!();
            print!("{}", format_trace(&response.trace));
        }
        Ok(())
    }

    async fn cmd_tools(
        config: OrcaConfig,
        user: &str,
        project: &str,
        json: bool,
    ) -> orca_core::Result<()> {
        let tools = build_tools(&config.tools).list_tools(user, project).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&tools)?);
            return Ok(());
        }
        if tools.is_empty() {
            println!("No tools available.");
            return Ok(());
        }
        for tool in &tools {
            if tool.description.is_empty() {
                println!("{}", tool.name);
            } else {
                println!("{}: {}", tool.name, tool.description);
            }
            for action in &tool.actions {
                let required = action.required_params();
                if required.is_empty() {
                    println!("  - {}", action.name);
                } else {
                    println!("  - {} (requires {})", action.name, required.join(", "));
                }
            }
        }
        Ok(())
    }

    fn cmd_config(config: OrcaConfig, json: bool) -> orca_core::Result<()> {
        let config = redacted(config);
        if json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| OrcaError::Config(e.to_string()))?
            );
        }
        Ok(())
    }
}

/// `RUST_LOG` wins, then `--log-level`, then `[logging].level`.
fn init_tracing(logging: &LoggingConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&logging.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format.as_str() {
        "json" => builder.json().with_target(true).init(),
        "compact" => builder.compact().with_target(false).init(),
        _ => builder.with_target(false).init(),
    }
}

fn redacted(mut config: OrcaConfig) -> OrcaConfig {
    for secret in [
        &mut config.llm.openai_api_key,
        &mut config.llm.gemini_api_key,
        &mut config.tools.auth_token,
    ] {
        if secret.is_some() {
            *secret = Some(REDACTED.into());
        }
    }
    config
}

fn format_observation(obs: &Observation) -> String {
    match (obs.result(), obs.error()) {
        (Some(result), _) if !result.message.is_empty() => {
            format!("{} ok: {}", obs.tool_name, truncate_chars(&result.message, 160))
        }
        (Some(result), _) => {
            let data = serde_json::Value::Object(result.data.clone()).to_string();
            format!("{} ok: {}", obs.tool_name, truncate_chars(&data, 160))
        }
        (None, Some(error)) => format!("{} error: {}", obs.tool_name, error),
        (None, None) => format!("{} (empty)", obs.tool_name),
    }
}

fn format_trace(trace: &Trace) -> String {
    let mut out = format!("Trace {}:\n", trace.id);
    for event in &trace.events {
        let offset = (event.at - trace.started).num_milliseconds();
        out.push_str(&format!("  +{offset:>5}ms {:<18} {}\n", event.name, event.detail));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use orca_core::ToolResult;
    use serde_json::{Map, json};

    #[test]
    fn test_parse_ask_with_scope() {
        let cli = Cli::try_parse_from([
            "orca", "ask", "open", "jira", "bugs", "-s", "s1", "-u", "u1", "-p", "p1", "--trace",
        ])
        .unwrap();
        let Commands::Ask {
            query,
            session,
            user,
            project,
            trace,
            json,
            ..
        } = cli.command
        else {
            panic!("expected ask");
        };
        assert_eq!(query.join(" "), "open jira bugs");
        assert_eq!((session.as_str(), user.as_str(), project.as_str()), ("s1", "u1", "p1"));
        assert!(trace);
        assert!(!json);
    }

    #[test]
    fn test_ask_requires_query() {
        assert!(Cli::try_parse_from(["orca", "ask"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["orca", "config", "--json", "--config", "/tmp/o.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/o.toml")));
        assert!(matches!(cli.command, Commands::Config { json: true }));
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["orca", "completions", "zsh"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Zsh }));
    }

    #[test]
    fn test_trace_and_json_conflict() {
        assert!(Cli::try_parse_from(["orca", "ask", "hi", "--trace", "--json"]).is_err());
    }

    #[test]
    fn test_redacted_hides_only_present_secrets() {
        let mut config = OrcaConfig::default();
        config.llm.openai_api_key = Some("sk-live".into());
        config.tools.auth_token = Some("tok".into());
        let config = redacted(config);
        assert_eq!(config.llm.openai_api_key.as_deref(), Some(REDACTED));
        assert_eq!(config.tools.auth_token.as_deref(), Some(REDACTED));
        assert!(config.llm.gemini_api_key.is_none());
    }

    #[test]
    fn test_format_observation() {
        let ok = Observation::success("store", ToolResult::ok(Map::new()).with_message("stored"));
        assert_eq!(format_observation(&ok), "store ok: stored");

        let mut data = Map::new();
        data.insert("count".into(), json!(3));
        let ok = Observation::success("app/jira", ToolResult::ok(data));
        assert_eq!(format_observation(&ok), "app/jira ok: {\"count\":3}");

        let failed = Observation::failure("app/jira", "tool blocked by policy");
        assert_eq!(format_observation(&failed), "app/jira error: tool blocked by policy");
    }

    #[test]
    fn test_format_trace_lists_events_in_order() {
        let mut trace = Trace::new("t-1");
        trace.add_event("run.start", "session=s");
        trace.add_event("run.finish", "observations=0");
        let out = format_trace(&trace);
        assert!(out.starts_with("Trace t-1:\n"));
        let start = out.find("run.start").unwrap();
        let finish = out.find("run.finish").unwrap();
        assert!(start < finish);
    }
}
