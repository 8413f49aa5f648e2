//! Telemetry configuration from environment variables.

use crosstalk::BusConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Environment name that disables bus diagnostics.
pub const PRODUCTION_ENV: &str = "production";

/// Configuration for logging, metrics and the bus built on top of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name, used as the bus name and in log lines
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or full directive
    pub log_level: String,

    /// Whether to write logs to the console at all
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Deployment environment, if declared
    pub environment: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "crosstalk".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            environment: None,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CROSSTALK_SERVICE_NAME`: Service name (default: crosstalk)
    /// - `CROSSTALK_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `CROSSTALK_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `CROSSTALK_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `CROSSTALK_ENV`: Deployment environment (default: unset)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            service_name: lookup("CROSSTALK_SERVICE_NAME")
                .unwrap_or_else(|| "crosstalk".to_string()),

            log_level: lookup("CROSSTALK_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("CROSSTALK_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: lookup("CROSSTALK_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),

            environment: lookup("CROSSTALK_ENV"),
        }
    }

    /// Whether this is a non-production deployment. An undeclared
    /// environment counts as production.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment
            .as_deref()
            .is_some_and(|env| env != PRODUCTION_ENV)
    }

    /// Bus configuration for this service: named after it, with subscriber
    /// failure diagnostics on only in development.
    #[must_use]
    pub fn bus_config(&self) -> BusConfig {
        BusConfig::default()
            .with_name(self.service_name.clone())
            .with_diagnostics(self.is_development())
    }
}
