//! # Synchronous Fan-out
//!
//! Delivery always runs over a snapshot taken under the registry lock, after
//! the lock is released. Handlers may therefore publish, subscribe or
//! unsubscribe re-entrantly: additions are not visited in the current pass
//! and removals only affect later passes.

use crate::config::BusConfig;
use crate::handler::Handler;
use crate::observer::{BusObserver, NoopObserver};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, trace};

/// Which registry a delivery came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// `publish` fan-out.
    Event,
    /// `set_state` fan-out.
    State,
    /// Current-value replay in `subscribe_state`.
    StateReplay,
    /// Availability broadcast.
    Lifecycle,
    /// Current-availability replay in `subscribe_lifecycle`.
    LifecycleReplay,
}

impl Channel {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::State => "state",
            Self::StateReplay => "state_replay",
            Self::Lifecycle => "lifecycle",
            Self::LifecycleReplay => "lifecycle_replay",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Handlers that completed successfully.
    pub delivered: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

impl DeliveryReport {
    /// Total handlers visited.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Failure reporting shared by every registry of one bus.
#[derive(Clone)]
pub(crate) struct Diagnostics {
    bus_name: Arc<str>,
    enabled: bool,
    observer: Arc<dyn BusObserver>,
}

impl Diagnostics {
    pub(crate) fn new(config: &BusConfig, observer: Arc<dyn BusObserver>) -> Self {
        Self {
            bus_name: Arc::from(config.name.as_str()),
            enabled: config.diagnostics,
            observer,
        }
    }

    pub(crate) fn observer(&self) -> &dyn BusObserver {
        self.observer.as_ref()
    }

    /// Invoke every handler in `handlers` with `arg`, isolating failures.
    pub(crate) fn deliver<T>(
        &self,
        channel: Channel,
        key: &str,
        handlers: &[Handler<T>],
        arg: &T,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for handler in handlers {
            match handler.invoke(arg) {
                Ok(()) => report.delivered += 1,
                Err(failure) => {
                    report.failed += 1;
                    self.observer.on_subscriber_failure(channel, key, &failure);
                    if self.enabled {
                        error!(
                            bus = %self.bus_name,
                            channel = %channel,
                            key = key,
                            error = %failure,
                            "Error in subscriber"
                        );
                    }
                }
            }
        }

        trace!(
            bus = %self.bus_name,
            channel = %channel,
            key = key,
            delivered = report.delivered,
            failed = report.failed,
            "Fan-out complete"
        );
        self.observer.on_delivery(channel, key, &report);
        report
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(&BusConfig::default(), Arc::new(NoopObserver))
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("bus_name", &self.bus_name)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
