//! Bus configuration.
//!
//! # Example
//!
//! ```
//! use crosstalk::BusConfig;
//!
//! let config = BusConfig::default()
//!     .with_name("storefront")
//!     .with_diagnostics(true);
//! assert!(config.diagnostics);
//! ```

use serde::{Deserialize, Serialize};

/// Default instance name used in log fields.
pub const DEFAULT_BUS_NAME: &str = "crosstalk";

/// Configuration injected at construction.
///
/// The bus never inspects its environment. Whether subscriber failures are
/// logged is decided by whoever builds the bus (see
/// `crosstalk_telemetry::TelemetryConfig::bus_config`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Instance name, attached to every log line.
    pub name: String,
    /// Log subscriber failures (development builds only).
    pub diagnostics: bool,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_BUS_NAME.to_string(),
            diagnostics: false,
        }
    }
}

impl BusConfig {
    /// Configuration for development: diagnostics on.
    #[must_use]
    pub fn development() -> Self {
        Self::default().with_diagnostics(true)
    }

    /// Builder-style method to set the instance name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style method to toggle subscriber-failure logging.
    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }
}
