use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::adverse_event::CorpusPaths;

/// Application-level constants
pub const APP_NAME: &str = "Medical Information Extractor";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "adverse_event_resolver=info,tower_http=info"
}

pub const ENV_BIND_ADDR: &str = "AER_BIND_ADDR";
pub const ENV_OLLAMA_URL: &str = "AER_OLLAMA_URL";
pub const ENV_MODEL: &str = "AER_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "AER_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "AER_MAX_RETRIES";
pub const ENV_DATA_DIR: &str = "AER_DATA_DIR";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime configuration for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub ollama_url: String,
    pub model: String,
    /// Per-attempt timeout for oracle calls.
    pub timeout_secs: u64,
    /// Oracle attempts per call.
    pub max_retries: u32,
    /// Directory holding the three corpus tier files.
    pub data_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 6302)),
            ollama_url: "http://localhost:11434".into(),
            model: "phi4:latest".into(),
            timeout_secs: 60,
            max_retries: 3,
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from `AER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = parse_value(ENV_BIND_ADDR, value)?;
        }
        if let Some(value) = lookup(ENV_OLLAMA_URL) {
            config.ollama_url = value;
        }
        if let Some(value) = lookup(ENV_MODEL) {
            config.model = value;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = parse_value(ENV_TIMEOUT_SECS, value)?;
        }
        if let Some(value) = lookup(ENV_MAX_RETRIES) {
            config.max_retries = parse_value(ENV_MAX_RETRIES, value)?;
        }
        if let Some(value) = lookup(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(value);
        }

        Ok(config)
    }

    pub fn corpus_paths(&self) -> CorpusPaths {
        CorpusPaths::in_dir(&self.data_dir)
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
