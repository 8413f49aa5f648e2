//! # CrossTalk Telemetry
//!
//! Logging and Prometheus metrics for hosts embedding the CrossTalk bus.
//!
//! ## Components
//!
//! - **Config:** `TelemetryConfig` read from the environment, including the
//!   development predicate that turns bus diagnostics on
//! - **Logging:** `tracing-subscriber` with pretty or JSON output
//! - **Metrics:** Prometheus counters fed by `MetricsObserver`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crosstalk_telemetry::{init_telemetry, shared_instrumented_bus, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config)?;
//!
//!     let bus = shared_instrumented_bus(&config);
//!     // Every module resolving crosstalk::global() now shares this bus.
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CROSSTALK_SERVICE_NAME` | `crosstalk` | Service and bus name |
//! | `CROSSTALK_LOG_LEVEL` | `info` | Log filter (falls back to `RUST_LOG`) |
//! | `CROSSTALK_CONSOLE_OUTPUT` | `true` | Write logs to the console |
//! | `CROSSTALK_JSON_LOGS` | `false` | JSON log lines |
//! | `CROSSTALK_ENV` | unset | Any value other than `production` enables bus diagnostics |

mod config;
mod logging;
mod metrics;

pub use config::{TelemetryConfig, PRODUCTION_ENV};
pub use logging::{env_filter, init_logging};
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, MetricsObserver, BUS_DELIVERIES,
    HANDLER_INVOCATIONS, LIFECYCLE_TRANSITIONS, REGISTRY, SUBSCRIBER_FAILURES,
};

use crosstalk::{CrossTalk, GLOBAL_KEY};
use std::sync::Arc;
use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the global log subscriber.
///
/// # Errors
///
/// Any error from `register_metrics` or `init_logging`.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_logging(config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name.clone(),
        metrics,
    })
}

/// Keeps the metrics handle alive for the lifetime of the host.
#[derive(Debug)]
pub struct TelemetryGuard {
    service_name: String,
    metrics: MetricsHandle,
}

impl TelemetryGuard {
    #[must_use]
    pub fn metrics(&self) -> &MetricsHandle {
        &self.metrics
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}

/// New bus configured from `config` and reporting to `MetricsObserver`.
#[must_use]
pub fn instrumented_bus(config: &TelemetryConfig) -> CrossTalk {
    CrossTalk::with_observer(config.bus_config(), Arc::new(MetricsObserver))
}

/// Resolve the process-wide bus, creating it instrumented if this is the
/// first resolution. A bus created earlier by someone else is returned as is.
#[must_use]
pub fn shared_instrumented_bus(config: &TelemetryConfig) -> CrossTalk {
    crosstalk::shared(GLOBAL_KEY, || instrumented_bus(config))
}
