//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::fetch::FetcherConfig;

/// Public match API of the 2018 competition.
pub const DEFAULT_API_URL: &str = "https://api.2018.halite.io/v1/api";

/// Games requested per player.
pub const DEFAULT_MATCH_LIMIT: u32 = 250;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Match API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root; player history lives under `user/<id>/match`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Number of most recent games to request
    #[serde(default = "default_match_limit")]
    pub match_limit: u32,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_match_limit() -> u32 {
    DEFAULT_MATCH_LIMIT
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("halite-stats/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            match_limit: default_match_limit(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// HTTP client settings for this API.
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            base_url: self.base_url.clone(),
            match_limit: self.match_limit,
            timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
            ..FetcherConfig::default()
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if self.api.match_limit == 0 {
            return Err(ConfigError::ValidationError(
                "Match limit must be greater than 0".to_string(),
            ));
        }

        let base_url = Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("API base URL {:?}: {}", self.api.base_url, e))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "API base URL must be http or https, got {}",
                base_url.scheme()
            )));
        }

        Ok(())
    }
}
