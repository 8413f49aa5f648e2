//! # Bus Observer
//!
//! Hook for instrumentation. The bus reports every fan-out, every isolated
//! subscriber failure and every lifecycle transition to its observer. All
//! methods default to no-ops; `crosstalk-telemetry` provides a Prometheus
//! implementation.

use crate::delivery::{Channel, DeliveryReport};
use crate::handler::SubscriberFailure;
use crate::lifecycle::LifecycleEvent;

/// Receives bus activity notifications.
///
/// Observer methods run on the caller's stack while a bus operation is in
/// progress. They must not call back into the bus.
pub trait BusObserver: Send + Sync {
    /// A fan-out finished for `key` on `channel`.
    fn on_delivery(&self, _channel: Channel, _key: &str, _report: &DeliveryReport) {}

    /// A single subscriber failed and was skipped.
    fn on_subscriber_failure(&self, _channel: Channel, _key: &str, _failure: &SubscriberFailure) {
    }

    /// The availability table changed.
    fn on_lifecycle(&self, _event: &LifecycleEvent) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl BusObserver for NoopObserver {}
