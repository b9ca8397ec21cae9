use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration, mapped from `orca.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrcaConfig {
    pub engine: EngineConfig,
    pub planner: PlannerConfig,
    pub policy: PolicyConfig,
    pub memory: MemoryConfig,
    pub context: ContextConfig,
    pub llm: LlmConfig,
    pub tools: ToolsConfig,
    pub logging: LoggingConfig,
}

// ── Engine ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum planner invocations per run before giving up.
    pub max_steps: usize,
    /// Per tool-call dispatch timeout in seconds.
    pub tool_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 4,
            tool_timeout_secs: 20,
        }
    }
}

// ── Planner ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// "heuristic" (keyword rules) or "model" (asks the LLM for a JSON plan).
    pub kind: String,
    /// Query keywords matched against tool names by the heuristic planner.
    pub keywords: Vec<String>,
    /// Action names preferred when a tool is selected without an explicit action.
    pub search_actions: Vec<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            kind: "heuristic".into(),
            keywords: [
                "jira",
                "ticket",
                "pr",
                "github",
                "pagerduty",
                "incident",
                "alert",
                "slack",
                "workflow",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            search_actions: vec!["search".into(), "list".into(), "query".into()],
        }
    }
}

// ── Policy ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// When non-empty, only these tools may be dispatched.
    pub allowlist: Vec<String>,
    /// These tools are always blocked, even if allow-listed.
    pub denylist: Vec<String>,
    /// Maximum tool dispatches per UTC day across all runs. 0 = unlimited.
    pub daily_tool_call_limit: u64,
}

// ── Memory ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub enabled: bool,
    /// SQLite database path. Defaults to `~/.orca/memory.db`.
    pub db_path: Option<PathBuf>,
    pub max_relevant_turns: usize,
    pub max_recent_turns: usize,
    /// Stored tool facts shown in the prompt. 0 disables the section.
    pub max_facts: usize,
    /// Turns older than this are folded into the session summary.
    /// 0 disables compression.
    pub compression_age_secs: u64,
}

/// Upper bound for `memory.compression_age_secs` (ten years).
pub const MAX_COMPRESSION_AGE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_path: None,
            max_relevant_turns: 5,
            max_recent_turns: 3,
            max_facts: 3,
            compression_age_secs: 600,
        }
    }
}

impl MemoryConfig {
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".orca")
                .join("memory.db")
        })
    }
}

// ── Context ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// System prompt placed at the top of every assembled context.
    pub system_prompt: Option<String>,
    /// Path to a file containing the system prompt (overrides `system_prompt`).
    pub system_prompt_file: Option<PathBuf>,
}

// ── LLM ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider used when a request carries no override, e.g. "openai".
    pub default_provider: Option<String>,
    /// Model used when a request carries no override.
    pub default_model: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub request_timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: None,
            default_model: None,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".into(),
            gemini_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            request_timeout_secs: 60,
            temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

// ── Tools ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Base URL of the remote tool service. None = no remote tools.
    pub remote_url: Option<String>,
    /// Bearer token sent to the remote tool service.
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            auth_token: None,
            request_timeout_secs: 15,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Info => "info",
        };
        write!(f, "{}: {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, " ({})", h)?;
        }
        Ok(())
    }
}

impl OrcaConfig {
    /// Validate the config and return a list of warnings.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Engine ───
        if self.engine.max_steps == 0 {
            warnings.push(ConfigWarning {
                field: "engine.max_steps".into(),
                message: "max_steps is 0, no run could ever plan".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 4".into()),
            });
        } else if self.engine.max_steps > 32 {
            warnings.push(ConfigWarning {
                field: "engine.max_steps".into(),
                message: format!("max_steps {} is very high", self.engine.max_steps),
                severity: WarningSeverity::Warning,
                hint: Some("A looping planner will burn through this many LLM calls".into()),
            });
        }
        if self.engine.tool_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                field: "engine.tool_timeout_secs".into(),
                message: "tool timeout is 0, every tool call would time out".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 20".into()),
            });
        }

        // ── Planner ───
        let valid_planners = ["heuristic", "model"];
        if !valid_planners.contains(&self.planner.kind.as_str()) {
            warnings.push(ConfigWarning {
                field: "planner.kind".into(),
                message: format!("unknown planner '{}'", self.planner.kind),
                severity: WarningSeverity::Error,
                hint: Some(format!("Valid values: {}", valid_planners.join(", "))),
            });
        }

        // ── Policy ───
        for name in &self.policy.allowlist {
            if self.policy.denylist.contains(name) {
                warnings.push(ConfigWarning {
                    field: "policy.allowlist".into(),
                    message: format!("'{}' is both allowed and denied; deny wins", name),
                    severity: WarningSeverity::Warning,
                    hint: None,
                });
            }
        }

        // ── Memory ───
        if self.memory.compression_age_secs > MAX_COMPRESSION_AGE_SECS {
            warnings.push(ConfigWarning {
                field: "memory.compression_age_secs".into(),
                message: format!(
                    "compression age {}s exceeds {}s",
                    self.memory.compression_age_secs, MAX_COMPRESSION_AGE_SECS
                ),
                severity: WarningSeverity::Error,
                hint: Some("Use 0 to disable compression".into()),
            });
        }

        // ── LLM ───
        if self.llm.temperature < 0.0 || self.llm.temperature > 2.0 {
            warnings.push(ConfigWarning {
                field: "llm.temperature".into(),
                message: format!("temperature {} is out of range", self.llm.temperature),
                severity: WarningSeverity::Error,
                hint: Some("Temperature must be between 0.0 and 2.0".into()),
            });
        }
        if self.llm.max_tokens == 0 {
            warnings.push(ConfigWarning {
                field: "llm.max_tokens".into(),
                message: "max_tokens is 0, the model won't produce output".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 2048".into()),
            });
        }
        if let Some(ref p) = self.llm.default_provider {
            let valid_providers = ["openai", "gemini"];
            if !valid_providers.contains(&p.as_str()) {
                warnings.push(ConfigWarning {
                    field: "llm.default_provider".into(),
                    message: format!("unknown provider '{}'", p),
                    severity: WarningSeverity::Warning,
                    hint: Some(format!("Built-in providers: {}", valid_providers.join(", "))),
                });
            }
        }
        if self.llm.openai_api_key.is_none() && self.llm.gemini_api_key.is_none() {
            warnings.push(ConfigWarning {
                field: "llm".into(),
                message: "no provider API key configured".into(),
                severity: WarningSeverity::Info,
                hint: Some("Set OPENAI_API_KEY or GEMINI_API_KEY".into()),
            });
        }

        // ── Tools ───
        if let Some(ref url) = self.tools.remote_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                warnings.push(ConfigWarning {
                    field: "tools.remote_url".into(),
                    message: format!("'{}' is not an http(s) URL", url),
                    severity: WarningSeverity::Error,
                    hint: Some("Use e.g. 'http://localhost:9100'".into()),
                });
            }
        }

        // ── Logging format ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // ── Logging level ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
