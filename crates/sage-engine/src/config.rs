//! Configuration management for the sage engine.
//!
//! Loads settings from an explicit path, /etc/sage/config.toml or
//! ./sage.toml, in that order, or falls back to defaults.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// System-wide config file path
pub const CONFIG_PATH: &str = "/etc/sage/config.toml";

/// Config file in the working directory
pub const LOCAL_CONFIG_PATH: &str = "sage.toml";

/// Credential values that mean "not configured"
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

/// Hosted chat-completions provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_hosted_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_hosted_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_hosted_model() -> String {
    "meta-llama/llama-3-8b-instruct".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_hosted_timeout() -> u64 {
    60
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_hosted_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_hosted_timeout(),
        }
    }
}

impl HostedConfig {
    /// API key from the configured environment variable.
    ///
    /// Unset, blank and placeholder values all count as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty() && key != PLACEHOLDER_API_KEY)
    }
}

/// Local Ollama server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_local_model")]
    pub model: String,

    /// Attempts per call, including the first
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fixed sleep between attempts
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    #[serde(default = "default_local_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_health_check_timeout")]
    pub health_check_timeout_ms: u64,
}

fn default_host() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_local_model() -> String {
    "llama3".to_string()
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    5
}

fn default_local_timeout() -> u64 {
    120
}

fn default_health_check_timeout() -> u64 {
    2000
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_local_model(),
            retries: default_retries(),
            retry_delay_secs: default_retry_delay(),
            timeout_secs: default_local_timeout(),
            health_check_timeout_ms: default_health_check_timeout(),
        }
    }
}

/// Heuristic (language-model) path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeuristicConfig {
    /// Fixed confidence attached to every parsed answer
    #[serde(default = "default_heuristic_confidence")]
    pub confidence: f64,
}

fn default_heuristic_confidence() -> f64 {
    0.85
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            confidence: default_heuristic_confidence(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub hosted: HostedConfig,

    #[serde(default)]
    pub local: LocalConfig,

    #[serde(default)]
    pub heuristic: HeuristicConfig,
}

impl Config {
    /// Load config from the first readable location, or use defaults
    pub fn load(explicit: Option<&Path>) -> Self {
        let first = match explicit {
            Some(path) => Self::load_from_path(path),
            None => Self::load_from_path(Path::new(CONFIG_PATH)),
        };
        first
            .or_else(|e| {
                if explicit.is_some() {
                    warn!("Could not load requested config: {}", e);
                    Self::load_from_path(Path::new(CONFIG_PATH))
                } else {
                    Err(e)
                }
            })
            .or_else(|_| Self::load_from_path(Path::new(LOCAL_CONFIG_PATH)))
            .unwrap_or_else(|e| {
                warn!("Config not found, using defaults: {}", e);
                Config::default()
            })
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}
