use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use orca_core::OrcaError;

use crate::schema::OrcaConfig;

/// Loads and reloads the Orca configuration.
pub struct ConfigLoader {
    config: Arc<RwLock<OrcaConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > ORCA_CONFIG env > ~/.orca/orca.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("ORCA_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".orca")
            .join("orca.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> orca_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::read_file(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            OrcaConfig::default()
        };

        let config = Self::finish(config)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Parse a config from a TOML string, applying env overrides and validation.
    pub fn from_toml(raw: &str) -> orca_core::Result<OrcaConfig> {
        let config = toml::from_str::<OrcaConfig>(raw)
            .map_err(|e| OrcaError::Config(format!("failed to parse config: {}", e)))?;
        Self::finish(config)
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> OrcaConfig {
        self.config.read().clone()
    }

    /// Get a shared handle to the live config.
    pub fn shared(&self) -> Arc<RwLock<OrcaConfig>> {
        Arc::clone(&self.config)
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reload the config from disk. The current config is kept on failure.
    pub fn reload(&self) -> orca_core::Result<()> {
        if !self.config_path.exists() {
            return Err(OrcaError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let new_config = Self::finish(Self::read_file(&self.config_path)?)?;
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }

    fn read_file(path: &Path) -> orca_core::Result<OrcaConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<OrcaConfig>(&raw).map_err(|e| {
            OrcaError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    fn finish(config: OrcaConfig) -> orca_core::Result<OrcaConfig> {
        let config = Self::apply_env_overrides(config);

        // Validate: log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => return Err(OrcaError::Config(e)),
        }
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(config: OrcaConfig) -> OrcaConfig {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` as the variable source.
    ///
    /// Engine and logging variables always win over the file. Credentials and
    /// endpoints only fill in values the file leaves unset.
    pub fn apply_overrides_from<F>(mut config: OrcaConfig, lookup: F) -> OrcaConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ORCA_MAX_STEPS") {
            match v.parse::<usize>() {
                Ok(n) => config.engine.max_steps = n,
                Err(_) => warn!(value = %v, "ignoring invalid ORCA_MAX_STEPS"),
            }
        }
        if let Some(v) = lookup("ORCA_TOOL_TIMEOUT_SECS") {
            match v.parse::<u64>() {
                Ok(n) => config.engine.tool_timeout_secs = n,
                Err(_) => warn!(value = %v, "ignoring invalid ORCA_TOOL_TIMEOUT_SECS"),
            }
        }
        if let Some(v) = lookup("ORCA_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Some(v) = lookup("ORCA_DEFAULT_PROVIDER") {
            config.llm.default_provider = Some(v);
        }
        if config.llm.openai_api_key.is_none() {
            config.llm.openai_api_key = lookup("OPENAI_API_KEY");
        }
        if config.llm.gemini_api_key.is_none() {
            config.llm.gemini_api_key = lookup("GEMINI_API_KEY");
        }
        if config.tools.remote_url.is_none() {
            config.tools.remote_url = lookup("ORCA_TOOLS_URL");
        }
        if config.tools.auth_token.is_none() {
            config.tools.auth_token = lookup("ORCA_TOOLS_TOKEN");
        }
        config
    }
}
