//! Structured logging setup.
//!
//! Installs a global `tracing` subscriber with an `EnvFilter` and either a
//! pretty console layer (development) or a JSON layer (log shippers).
//! Bus log lines carry a `bus` field naming the instance, so JSON output can
//! be filtered per service.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the level filter from `config.log_level`.
///
/// The environment is not consulted here: `TelemetryConfig` has already
/// resolved `CROSSTALK_LOG_LEVEL` over `RUST_LOG`.
///
/// # Errors
///
/// `TelemetryError::Config` if the configured directive does not parse.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|e| TelemetryError::Config(e.to_string()))
}

/// Install the global subscriber.
///
/// # Errors
///
/// `TelemetryError::Config` for a bad filter directive and
/// `TelemetryError::LoggingInit` if a global subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = env_filter(config)?;

    if !config.console_output {
        tracing_subscriber::registry()
            .with(filter)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        return Ok(());
    }

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        development = config.is_development(),
        "Logging initialized"
    );
    Ok(())
}

/// Log a bus-related event with standard fields.
///
/// ```rust,ignore
/// log_bus_event!(info, "storefront", "cart:updated", "Cart refreshed", items = 3);
/// ```
#[macro_export]
macro_rules! log_bus_event {
    ($level:ident, $bus:expr, $key:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            bus = %$bus,
            key = %$key,
            $($($field)*,)?
            $msg
        )
    };
}
