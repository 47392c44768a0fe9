//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section and field carries a compiled-in default, and a missing
//! or malformed file degrades to those defaults with a warning rather
//! than failing startup. Secrets (API keys, bot tokens) are referenced
//! by env-var name in the config and resolved at runtime.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use tracing::warn;

use crate::engine::scheduler::{CLOSED_INTERVAL_SECS, FAULT_BACKOFF_SECS, OPEN_INTERVAL_SECS};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentConfig,
    pub scheduler: SchedulerSettings,
    pub analysis: AnalysisConfig,
    pub alerts: AlertsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    pub name: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "SENTINEL-001".to_string(),
        }
    }
}

/// Loop timing. The defaults are the designed constants; overriding them
/// is mainly useful for soak tests and local experiments.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SchedulerSettings {
    pub open_interval_secs: u64,
    pub closed_interval_secs: u64,
    pub fault_backoff_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            open_interval_secs: OPEN_INTERVAL_SECS,
            closed_interval_secs: CLOSED_INTERVAL_SECS,
            fault_backoff_secs: FAULT_BACKOFF_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analysis service URL. Unset selects the built-in demo engine.
    pub endpoint: Option<String>,
    /// Env-var name holding the analysis service API key.
    pub api_key_env: Option<String>,
    /// Upper bound on one analysis run, in seconds. Unset means unbounded.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AlertsConfig {
    pub telegram_bot_token_env: Option<String>,
    pub telegram_chat_id_env: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any failure.
    ///
    /// Configuration problems are never fatal here: the agent starts with
    /// the compiled-in defaults and the problem is logged as a warning.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path,
                    error = format!("{e:#}"),
                    "Configuration unavailable — continuing with defaults"
                );
                Self::default()
            }
        }
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
