//! Configuration management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Which backend adapter to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Deterministic dictionary backend, no model required
    Mock,
    /// External inference program spoken to over stdin/stdout
    Command,
    /// Model inference server spoken to over HTTP
    Http,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Mock => write!(f, "mock"),
            BackendKind::Command => write!(f, "command"),
            BackendKind::Http => write!(f, "http"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(BackendKind::Mock),
            "command" => Ok(BackendKind::Command),
            "http" => Ok(BackendKind::Http),
            other => Err(anyhow::anyhow!("unknown backend '{}' (expected mock, command or http)", other)),
        }
    }
}

/// Configuration for the translation bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub backend: BackendKind,
    pub model_dir: Option<PathBuf>,
    pub command: Vec<String>,
    pub endpoint: String,
    pub cache_capacity: usize,
    pub cache_ttl_secs: u64,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub init_cooldown_ms: u64,
}

const DEFAULT_COMMAND: &str = "python3 indictrans_worker.py";
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5005/translate";

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Mock,
            model_dir: None,
            command: split_command(DEFAULT_COMMAND),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cache_capacity: 1000,
            cache_ttl_secs: 3600,
            timeout_ms: 30000,
            max_retries: 0,
            retry_delay_ms: 500,
            init_cooldown_ms: 0,
        }
    }
}

fn split_command(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

fn env_or<T: FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {}='{}': {}", key, value, e)),
        Err(_) => Ok(default),
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let backend = env_or("BRIDGE_BACKEND", defaults.backend)?;

        let model_dir = std::env::var("BRIDGE_MODEL_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let command = std::env::var("BRIDGE_COMMAND")
            .map(|c| split_command(&c))
            .unwrap_or(defaults.command);

        let endpoint = std::env::var("BRIDGE_ENDPOINT").unwrap_or(defaults.endpoint);

        Ok(Self {
            backend,
            model_dir,
            command,
            endpoint,
            cache_capacity: env_or("BRIDGE_CACHE_CAPACITY", defaults.cache_capacity)?,
            cache_ttl_secs: env_or("BRIDGE_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            timeout_ms: env_or("BRIDGE_TIMEOUT_MS", defaults.timeout_ms)?,
            max_retries: env_or("BRIDGE_MAX_RETRIES", defaults.max_retries)?,
            retry_delay_ms: env_or("BRIDGE_RETRY_DELAY_MS", defaults.retry_delay_ms)?,
            init_cooldown_ms: env_or("BRIDGE_INIT_COOLDOWN_MS", defaults.init_cooldown_ms)?,
        })
    }

    /// Load from JSON file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache_capacity == 0 {
            return Err(anyhow::anyhow!("cache_capacity must be greater than 0"));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        match self.backend {
            BackendKind::Command if self.command.is_empty() => {
                return Err(anyhow::anyhow!("command backend requires a command"));
            }
            BackendKind::Http if self.endpoint.trim().is_empty() => {
                return Err(anyhow::anyhow!("http backend requires an endpoint"));
            }
            BackendKind::Mock if self.model_dir.is_some() => {
                warn!("model_dir is ignored by the mock backend");
            }
            _ => {}
        }

        Ok(())
    }

    /// Per-call backend deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache entry lifetime, `None` when entries never expire
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    /// How long a failed model load blocks new attempts
    pub fn init_cooldown(&self) -> Option<Duration> {
        (self.init_cooldown_ms > 0).then(|| Duration::from_millis(self.init_cooldown_ms))
    }
}
