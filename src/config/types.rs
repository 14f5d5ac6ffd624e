//! Configuration types, defaults, loading, and validation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::agents::AgentDirectory;
use crate::session::{DEFAULT_LOG_CAPACITY, Mode};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Agent gateway and agent identities
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Session behaviour
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log to file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the agents live and who they are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Gateway base URL; `/agent` and `/upload` are appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_analyst_id")]
    pub analyst: String,

    #[serde(default = "default_debate_id")]
    pub debate: String,

    #[serde(default = "default_creator_id")]
    pub creator: String,

    #[serde(default = "default_orchestrator_id")]
    pub orchestrator: String,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_analyst_id() -> String {
    AgentDirectory::default().analyst
}

fn default_debate_id() -> String {
    AgentDirectory::default().debate
}

fn default_creator_id() -> String {
    AgentDirectory::default().creator
}

fn default_orchestrator_id() -> String {
    AgentDirectory::default().orchestrator
}

impl Default for AgentsConfig {
    fn default() -> Self {
        let ids = AgentDirectory::default();
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            analyst: ids.analyst,
            debate: ids.debate,
            creator: ids.creator,
            orchestrator: ids.orchestrator,
        }
    }
}

impl AgentsConfig {
    pub fn directory(&self) -> AgentDirectory {
        AgentDirectory {
            analyst: self.analyst.clone(),
            debate: self.debate.clone(),
            creator: self.creator.clone(),
            orchestrator: self.orchestrator.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Starting presentation mode
    #[serde(default)]
    pub mode: Mode,

    /// Activity log entries kept
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    /// Debate rounds offered before the finale
    #[serde(default = "default_max_debate_rounds")]
    pub max_debate_rounds: u32,
}

fn default_log_capacity() -> usize {
    DEFAULT_LOG_CAPACITY
}

fn default_max_debate_rounds() -> u32 {
    3
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            log_capacity: default_log_capacity(),
            max_debate_rounds: default_max_debate_rounds(),
        }
    }
}

/// Base directory: `~/.vibesplit/`
pub fn vibesplit_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vibesplit")
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. System config: ~/.vibesplit/config.toml
    /// 3. Local config: ./vibesplit.toml
    /// 4. Environment variables
    pub fn load() -> Result<Self> {
        tracing::debug!("Loading configuration...");

        let mut config = Self::default();

        let system_config_path = Self::system_config_path();
        if system_config_path.exists() {
            tracing::debug!("Loading system config from: {:?}", system_config_path);
            config = Self::read_file(&system_config_path)?;
        }

        let local_config_path = Self::local_config_path();
        if local_config_path.exists() {
            tracing::debug!("Loading local config from: {:?}", local_config_path);
            config = Self::read_file(&local_config_path)?;
        }

        config = Self::apply_env_overrides(config, |key| std::env::var(key).ok())?;

        tracing::debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load configuration from a specific file path, then apply env overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from custom path: {:?}", path);

        if !path.exists() {
            anyhow::bail!("Config file not found: {:?}", path);
        }
        let config = Self::read_file(path)?;
        let config = Self::apply_env_overrides(config, |key| std::env::var(key).ok())?;

        tracing::debug!("Configuration loaded successfully from custom path");
        Ok(config)
    }

    /// System config path: ~/.vibesplit/config.toml
    pub fn system_config_path() -> PathBuf {
        vibesplit_home().join("config.toml")
    }

    /// Local config path: ./vibesplit.toml
    fn local_config_path() -> PathBuf {
        PathBuf::from("./vibesplit.toml")
    }

    /// A file replaces everything below it; missing sections keep defaults.
    fn read_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn apply_env_overrides<F>(mut config: Self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = var("VIBESPLIT_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(file) = var("VIBESPLIT_LOG_FILE") {
            config.logging.file = Some(PathBuf::from(file));
        }

        if let Some(url) = var("VIBESPLIT_AGENT_URL") {
            config.agents.base_url = url;
        }

        if let Some(mode) = var("VIBESPLIT_MODE") {
            config.session.mode = mode
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid VIBESPLIT_MODE")?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        tracing::debug!("Validating configuration...");

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        if self.agents.base_url.trim().is_empty() {
            anyhow::bail!("agents.base_url is empty");
        }

        let ids = [
            ("analyst", &self.agents.analyst),
            ("debate", &self.agents.debate),
            ("creator", &self.agents.creator),
            ("orchestrator", &self.agents.orchestrator),
        ];
        if let Some((name, _)) = ids.iter().find(|(_, id)| id.trim().is_empty()) {
            anyhow::bail!("agents.{} id is empty", name);
        }

        if self.session.log_capacity == 0 {
            anyhow::bail!("session.log_capacity must be at least 1");
        }

        if self.session.max_debate_rounds == 0 {
            anyhow::bail!("session.max_debate_rounds must be at least 1");
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        tracing::info!("Configuration saved to: {:?}", path);
        Ok(())
    }
}
