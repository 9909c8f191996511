use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// User-Agent sent with every SEC request (fair-access requirement)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// HTTP client settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpConfig {
    // @field: Request timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Retry attempts per request
    #[serde(default = "default_retries")]
    pub retries: u32,

    // @field: Pause after each successful request, milliseconds
    #[serde(default = "default_polite_delay_ms")]
    pub polite_delay_ms: u64,
}

/// Log level for application logging
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

fn default_user_agent() -> String {
    "edgar13f/1.0 (contact: holdings@example.com)".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_retries() -> u32 {
    3
}

fn default_polite_delay_ms() -> u64 {
    500
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            polite_delay_ms: default_polite_delay_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            user_agent: default_user_agent(),
            http: HttpConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = FileManager::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path.as_ref(), e))?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(anyhow!("user_agent must not be empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(anyhow!("http.timeout_secs must be greater than zero"));
        }
        if self.http.retries == 0 {
            return Err(anyhow!("http.retries must be greater than zero"));
        }
        Ok(())
    }
}
