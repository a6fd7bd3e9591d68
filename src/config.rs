//! Configuration management for Parley
//!
//! Handles loading, parsing, validating, and defaulting configuration
//! from a YAML file. Every field has a serde default so a missing file or
//! a partial file both work; CLI flags and environment variables override
//! file values where noted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ParleyError, Result};
use crate::render::Theme;

/// Main configuration structure for Parley
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Response gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// History persistence settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Presentation settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Response gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// API base URL
    ///
    /// Overridable so tests can point the gateway at a mock server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Cap on a single gateway round trip, in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// History persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Database path override
    ///
    /// When unset, the store lives in the user's data directory; the
    /// `PARLEY_HISTORY_DB` environment variable also overrides this.
    #[serde(default)]
    pub path: Option<String>,
}

/// Presentation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Palette for rendered assistant messages
    #[serde(default)]
    pub theme: Theme,
}

impl Config {
    /// Loads configuration from a YAML file
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::config::Config;
    ///
    /// let config = Config::load("does-not-exist.yaml").unwrap();
    /// assert_eq!(config.gateway.timeout_seconds, 60);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ParleyError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Config` when a field is unusable.
    pub fn validate(&self) -> Result<()> {
        if self.gateway.base_url.is_empty() {
            return Err(ParleyError::Config("gateway.base_url must not be empty".into()).into());
        }
        if !self.gateway.base_url.starts_with("http://")
            && !self.gateway.base_url.starts_with("https://")
        {
            return Err(ParleyError::Config(format!(
                "gateway.base_url must be an http(s) URL, got {}",
                self.gateway.base_url
            ))
            .into());
        }
        if self.gateway.model.is_empty() {
            return Err(ParleyError::Config("gateway.model must not be empty".into()).into());
        }
        if self.gateway.timeout_seconds == 0 {
            return Err(
                ParleyError::Config("gateway.timeout_seconds must be at least 1".into()).into(),
            );
        }
        Ok(())
    }
}
