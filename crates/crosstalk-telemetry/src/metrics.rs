//! Prometheus metrics for bus activity.
//!
//! All metrics follow the naming convention: `crosstalk_<metric>_<unit>`
//!
//! ## Metrics
//!
//! | Metric | Labels | Meaning |
//! |--------|--------|---------|
//! | `crosstalk_deliveries_total` | `channel` | fan-outs that reached at least one handler |
//! | `crosstalk_handler_invocations_total` | `channel` | handlers invoked |
//! | `crosstalk_subscriber_failures_total` | `channel` | handlers that returned an error or panicked |
//! | `crosstalk_lifecycle_transitions_total` | `status` | availability announcements that changed the table |

use crosstalk::{BusObserver, Channel, DeliveryReport, LifecycleEvent, SubscriberFailure};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Fan-outs by channel
    pub static ref BUS_DELIVERIES: CounterVec = CounterVec::new(
        Opts::new("crosstalk_deliveries_total", "Fan-outs that reached at least one handler"),
        &["channel"]
    ).expect("metric creation failed");

    /// Handler invocations by channel
    pub static ref HANDLER_INVOCATIONS: CounterVec = CounterVec::new(
        Opts::new("crosstalk_handler_invocations_total", "Handlers invoked during fan-out"),
        &["channel"]
    ).expect("metric creation failed");

    /// Isolated subscriber failures by channel
    pub static ref SUBSCRIBER_FAILURES: CounterVec = CounterVec::new(
        Opts::new("crosstalk_subscriber_failures_total", "Handlers that failed during fan-out"),
        &["channel"]
    ).expect("metric creation failed");

    /// Availability transitions by status
    pub static ref LIFECYCLE_TRANSITIONS: CounterVec = CounterVec::new(
        Opts::new("crosstalk_lifecycle_transitions_total", "Module availability transitions"),
        &["status"]
    ).expect("metric creation failed");
}

/// Proof that the bus metrics are registered with `REGISTRY`.
#[derive(Debug, Clone)]
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the global registry. Registering again is a
/// no-op.
///
/// # Errors
///
/// `TelemetryError::MetricsInit` if the registry rejects a collector for
/// any reason other than it already being present.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BUS_DELIVERIES.clone()),
        Box::new(HANDLER_INVOCATIONS.clone()),
        Box::new(SUBSCRIBER_FAILURES.clone()),
        Box::new(LIFECYCLE_TRANSITIONS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: REGISTRY.clone(),
    })
}

/// Encode all metrics as Prometheus text format.
///
/// # Errors
///
/// `TelemetryError::MetricsInit` if encoding fails.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// `BusObserver` that feeds the counters above.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsObserver;

impl BusObserver for MetricsObserver {
    fn on_delivery(&self, channel: Channel, _key: &str, report: &DeliveryReport) {
        let label = [channel.as_str()];
        BUS_DELIVERIES.with_label_values(&label).inc();
        HANDLER_INVOCATIONS
            .with_label_values(&label)
            .inc_by(report.attempted() as f64);
    }

    fn on_subscriber_failure(&self, channel: Channel, _key: &str, _failure: &SubscriberFailure) {
        SUBSCRIBER_FAILURES
            .with_label_values(&[channel.as_str()])
            .inc();
    }

    fn on_lifecycle(&self, event: &LifecycleEvent) {
        LIFECYCLE_TRANSITIONS
            .with_label_values(&[event.status.as_str()])
            .inc();
    }
}
