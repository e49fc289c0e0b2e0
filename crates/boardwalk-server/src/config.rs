//! Configuration file parsing for the board service.
//!
//! Loads bind address, database location, log filter and the calendar
//! event settings from TOML. Every field has a default.

use boardwalk_engine::events::{DEFAULT_TIMEOUT_SECS, DEFAULT_TOPIC};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),
}

/// Service configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (default: 9090)
    pub bind_port: u16,

    /// SQLite database file, or ":memory:"
    pub database_path: String,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Calendar event publishing
    pub events: EventsConfig,
}

/// Calendar event settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Send events to `endpoint`; when false they are only logged
    pub enabled: bool,

    /// Base URL of the event endpoint (e.g., "http://localhost:8082")
    pub endpoint: String,

    /// Topic name
    pub topic: String,

    /// Publish timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 9090,
            database_path: "boardwalk.db".to_string(),
            log_filter: "info".to_string(),
            events: EventsConfig::default(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        EventsConfig {
            enabled: false,
            endpoint: "http://localhost:8082".to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EventsConfig {
    /// Publish timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check fields that have no usable fallback
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingField("database_path".to_string()));
        }
        if self.events.enabled && self.events.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("events.endpoint".to_string()));
        }
        Ok(())
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            database_path: ":memory:".to_string(),
            log_filter: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
