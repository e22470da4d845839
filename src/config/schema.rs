//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the sales API.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// Web listener settings (bind address, timeouts).
    pub web: WebConfig,

    /// Data store settings.
    pub database: DatabaseConfig,

    /// Logging, metrics and debug endpoint settings.
    pub observability: ObservabilityConfig,
}

/// Web listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub address: String,

    /// Time allowed to read a request's headers, in seconds.
    pub read_timeout_secs: u64,

    /// Time allowed to produce a response, in seconds.
    pub write_timeout_secs: u64,

    /// Deadline for in-flight requests once shutdown starts, in seconds.
    pub shutdown_timeout_secs: u64,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl WebConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8000".to_string(),
            read_timeout_secs: 5,
            write_timeout_secs: 5,
            shutdown_timeout_secs: 5,
            max_connections: 10_000,
        }
    }
}

/// Data store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Load the development data set at startup.
    pub seed: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { seed: true }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for production.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Prometheus exporter bind address.
    pub metrics_address: String,

    /// Bind address for the debug endpoints (`/debug/vars`, `/debug/readiness`).
    pub debug_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            debug_address: "0.0.0.0:4000".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.web.address, "0.0.0.0:8000");
        assert_eq!(config.web.shutdown_timeout(), Duration::from_secs(5));
        assert!(config.database.seed);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            [web]
            address = "127.0.0.1:3000"
            shutdown_timeout_secs = 20

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.web.address, "127.0.0.1:3000");
        assert_eq!(config.web.shutdown_timeout_secs, 20);
        assert_eq!(config.web.read_timeout_secs, 5);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
    }
}
