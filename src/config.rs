use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable pointing at an alternative config file
pub const CONFIG_ENV: &str = "HOOPCHAT_CONFIG";

/// Environment variable overriding the query endpoint
pub const ENDPOINT_ENV: &str = "HOOPCHAT_ENDPOINT";

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/query";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where queries are posted
    pub endpoint: EndpointConfig,

    /// UI preferences
    pub ui: UiConfig,

    /// Hoopchat home directory, always `~/.hoopchat`; holds the log file
    #[serde(skip)]
    pub home: PathBuf,
}

/// Query endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub url: String,
    /// Whole-request timeout; no timeout when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub placeholder: String,
    pub tick_rate_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "Basketball Chatbot 🏀⛹🏾".to_string(),
            placeholder: "Type your message...".to_string(),
            tick_rate_ms: 120,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            ui: UiConfig::default(),
            home: default_home(),
        }
    }
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hoopchat")
}

fn resolve_path_with(explicit: Option<&Path>, env: Option<String>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => default_home().join("config.toml"),
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Resolve the config file path: explicit path, then `HOOPCHAT_CONFIG`,
    /// then `~/.hoopchat/config.toml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        resolve_path_with(explicit, std::env::var(CONFIG_ENV).ok())
    }

    /// Load configuration from file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            Config::default()
        };

        Ok(config)
    }

    /// Save configuration to file, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, self.to_toml()?).context("Failed to write config file")?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Apply the endpoint override: CLI flag first, then `HOOPCHAT_ENDPOINT`
    pub fn apply_endpoint_override(&mut self, cli: Option<String>) {
        self.override_endpoint(cli, std::env::var(ENDPOINT_ENV).ok());
    }

    fn override_endpoint(&mut self, cli: Option<String>, env: Option<String>) {
        let env = env.filter(|v| !v.trim().is_empty());
        if let Some(url) = cli.or(env) {
            self.endpoint.url = url;
        }
    }

    /// Log file used by the interactive UI
    pub fn log_path(&self) -> PathBuf {
        self.home.join("hoopchat.log")
    }
}
