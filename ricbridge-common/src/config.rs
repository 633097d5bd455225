//! Bridge configuration
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! an optional YAML file, and the process environment (`AI_HOST`,
//! `AI_PORT`, `AI_CONFIG_PORT`, `NS3_CONTROL_DIR`, `XAPP_ID`).
//!
//! # Example
//!
//! ```rust,ignore
//! use ricbridge_common::config::load_config;
//!
//! let config = load_config("config/bridge.yaml")?;
//! config.validate()?;
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::LogLevel;

/// Environment variable naming the agent host.
pub const ENV_AI_HOST: &str = "AI_HOST";
/// Environment variable naming the agent port.
pub const ENV_AI_PORT: &str = "AI_PORT";
/// Environment variable naming the legacy config ingress port.
pub const ENV_AI_CONFIG_PORT: &str = "AI_CONFIG_PORT";
/// Environment variable naming the legacy control-file directory.
pub const ENV_NS3_CONTROL_DIR: &str = "NS3_CONTROL_DIR";
/// Environment variable naming the xApp instance id.
pub const ENV_XAPP_ID: &str = "XAPP_ID";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML or environment value parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Agent host must not be empty")]
    EmptyHost,

    #[error("Port for {0} must be non-zero")]
    ZeroPort(&'static str),

    #[error("Agent poll interval must be positive")]
    ZeroPollInterval,

    #[error("Recommendation pool needs at least one worker and one queue slot")]
    EmptyWorkerPool,

    #[error("Listen backlog must be positive")]
    ZeroBacklog,
}

/// Connection settings for the external decision agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub host: String,
    pub port: u16,
    /// Listener poll timeout in milliseconds
    pub poll_interval_ms: u64,
    /// The listener retries a lost connection once per this many polls
    pub reconnect_every_polls: u32,
    pub connect_timeout_ms: u64,
    /// Upper bound on a recommendation round trip; `None` waits forever
    pub recommendation_timeout_ms: Option<u64>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            poll_interval_ms: 100,
            reconnect_every_polls: 10,
            connect_timeout_ms: 3000,
            recommendation_timeout_ms: None,
        }
    }
}

impl AgentSettings {
    /// `host:port` string used for connecting and in log lines.
    pub fn peer(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn recommendation_timeout(&self) -> Option<Duration> {
        self.recommendation_timeout_ms.map(Duration::from_millis)
    }
}

/// Legacy config ingress server and control-file sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngressSettings {
    pub port: u16,
    pub backlog: u32,
    pub control_dir: PathBuf,
}

impl Default for IngressSettings {
    fn default() -> Self {
        Self {
            port: 5001,
            backlog: 5,
            control_dir: PathBuf::from("/tmp/ns3-control"),
        }
    }
}

/// xApp-side settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XappSettings {
    /// Reported as `handler_id` in A1 policy acknowledgements
    pub xapp_id: String,
    pub recommendation_workers: usize,
    pub recommendation_queue: usize,
    pub control_requestor_id: u32,
    pub control_instance_id: u32,
    pub control_ran_function_id: u16,
}

impl Default for XappSettings {
    fn default() -> Self {
        Self {
            xapp_id: "ricbridge-xapp".to_string(),
            recommendation_workers: 4,
            recommendation_queue: 64,
            control_requestor_id: 1,
            control_instance_id: 1,
            control_ran_function_id: 300,
        }
    }
}

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub log_level: LogLevel,
    pub agent: AgentSettings,
    pub ingress: IngressSettings,
    pub xapp: XappSettings,
}

impl BridgeConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlays environment values obtained through `lookup`.
    ///
    /// Unset variables leave the current value untouched; set but
    /// unparsable ones are an error rather than a silent default.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_AI_HOST) {
            self.agent.host = host;
        }
        if let Some(port) = lookup(ENV_AI_PORT) {
            self.agent.port = parse_port(ENV_AI_PORT, &port)?;
        }
        if let Some(port) = lookup(ENV_AI_CONFIG_PORT) {
            self.ingress.port = parse_port(ENV_AI_CONFIG_PORT, &port)?;
        }
        if let Some(dir) = lookup(ENV_NS3_CONTROL_DIR) {
            self.ingress.control_dir = PathBuf::from(dir);
        }
        if let Some(id) = lookup(ENV_XAPP_ID) {
            self.xapp.xapp_id = id;
        }
        Ok(())
    }

    /// Checks that every value is usable.
    ///
    /// # Validation Rules
    ///
    /// - agent host is non-empty, agent and ingress ports are non-zero
    /// - poll interval, reconnect period and backlog are positive
    /// - the recommendation pool has at least one worker and one slot
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.agent.host.trim().is_empty() {
            return Err(ConfigValidationError::EmptyHost);
        }
        if self.agent.port == 0 {
            return Err(ConfigValidationError::ZeroPort("agent"));
        }
        if self.ingress.port == 0 {
            return Err(ConfigValidationError::ZeroPort("ingress"));
        }
        if self.agent.poll_interval_ms == 0 || self.agent.reconnect_every_polls == 0 {
            return Err(ConfigValidationError::ZeroPollInterval);
        }
        if self.ingress.backlog == 0 {
            return Err(ConfigValidationError::ZeroBacklog);
        }
        if self.xapp.recommendation_workers == 0 || self.xapp.recommendation_queue == 0 {
            return Err(ConfigValidationError::EmptyWorkerPool);
        }
        Ok(())
    }
}

fn parse_port(var: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::ParseError(format!("{var}={value:?}: {e}")))
}

/// Loads a configuration from a YAML file, then applies the environment.
///
/// # Arguments
///
/// * `path` - Path to the YAML configuration file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BridgeConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let mut config = load_config_from_str(&contents)?;
    config.apply_env_with(|key| std::env::var(key).ok())?;
    Ok(config)
}

/// Parses a configuration from a YAML string. Missing keys keep defaults.
pub fn load_config_from_str(yaml: &str) -> Result<BridgeConfig, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
}
