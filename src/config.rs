//! Configuration loading.
//!
//! Configuration is loaded from TOML with the following resolution order:
//! 1. `--config <path>` (CLI flag / explicit path)
//! 2. `~/.scoutboard/config.toml` (user)
//! 3. `/etc/scoutboard/config.toml` (system)
//!
//! When no file exists, built-in defaults are used. Every section and field
//! is optional.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::api::{ApiClient, DEFAULT_BASE_URL, RetryConfig};
use crate::cache::{CacheOptions, RevalidateMode};
use crate::{Result, ScoutboardError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Upstream API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL (default: http://localhost:8000).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            retry: RetrySettings::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl ApiConfig {
    /// Build the HTTP client these settings describe.
    pub fn client(&self) -> Result<ApiClient> {
        Ok(
            ApiClient::with_timeout(&self.base_url, Duration::from_secs(self.timeout_secs))?
                .with_retry(RetryConfig::from(&self.retry)),
        )
    }
}

/// Retry settings for API requests. Off by default (single attempt).
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        RetryConfig::new()
            .max_attempts(settings.max_attempts)
            .initial_delay(Duration::from_millis(settings.initial_delay_ms))
            .max_delay(Duration::from_millis(settings.max_delay_ms))
    }
}

/// Cache defaults and per-endpoint overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Default TTL in milliseconds (default: 300000, five minutes).
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: i64,
    /// Default revalidation mode (default: strict).
    #[serde(default)]
    pub mode: RevalidateMode,
    /// Overrides keyed by endpoint cache key (e.g. `players-leaders`).
    #[serde(default)]
    pub endpoints: HashMap<String, EndpointCacheConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            mode: RevalidateMode::default(),
            endpoints: HashMap::new(),
        }
    }
}

fn default_ttl_ms() -> i64 {
    5 * 60 * 1000
}

/// Override for a single endpoint; unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointCacheConfig {
    #[serde(default)]
    pub ttl_ms: Option<i64>,
    #[serde(default)]
    pub mode: Option<RevalidateMode>,
}

impl CacheConfig {
    /// Effective options for an endpoint key.
    pub fn options_for(&self, key: &str) -> Result<CacheOptions> {
        let overrides = self.endpoints.get(key);
        let ttl_ms = overrides.and_then(|o| o.ttl_ms).unwrap_or(self.ttl_ms);
        let mode = overrides.and_then(|o| o.mode).unwrap_or(self.mode);
        CacheOptions::from_millis(ttl_ms)
            .map(|options| options.mode(mode))
            .map_err(|e| match e {
                ScoutboardError::Configuration(msg) => {
                    ScoutboardError::Configuration(format!("cache options for {key}: {msg}"))
                }
                other => other,
            })
    }

    /// Reject negative TTLs anywhere in the table.
    pub fn validate(&self) -> Result<()> {
        CacheOptions::from_millis(self.ttl_ms)?;
        for key in self.endpoints.keys() {
            self.options_for(key)?;
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from the standard locations, falling back to
    /// defaults when no file is found.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a specific file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScoutboardError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ScoutboardError::Configuration(msg) => {
                ScoutboardError::Configuration(format!("{path:?}: {msg}"))
            }
            other => other,
        })
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| {
            ScoutboardError::Configuration(format!("Failed to parse config: {e}"))
        })?;
        config.cache.validate()?;
        Ok(config)
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ScoutboardError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".scoutboard").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/scoutboard/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
