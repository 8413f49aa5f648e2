//! # Telemetry Wiring
//!
//! The host decides, from its environment, whether subscriber failures are
//! logged, and can count bus activity through Prometheus.

#[cfg(test)]
mod tests {
    use crate::fixtures::{failing, LogCapture, Recorder};
    use crosstalk::{CrossTalk, MessageBus};
    use crosstalk_telemetry::{
        encode_metrics, instrumented_bus, register_metrics, TelemetryConfig,
        HANDLER_INVOCATIONS, SUBSCRIBER_FAILURES,
    };
    use serde_json::json;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> TelemetryConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        TelemetryConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_environment_drives_diagnostics() {
        let dev = config_from(&[("CROSSTALK_ENV", "development")]);
        let prod = config_from(&[("CROSSTALK_ENV", "production")]);
        let unset = config_from(&[]);

        assert!(instrumented_bus(&dev).config().diagnostics);
        assert!(!instrumented_bus(&prod).config().diagnostics);
        assert!(!instrumented_bus(&unset).config().diagnostics);
    }

    #[test]
    fn test_failure_handling_identical_with_and_without_diagnostics() {
        for env in ["development", "production"] {
            let bus = instrumented_bus(&config_from(&[("CROSSTALK_ENV", env)]));
            let good = Recorder::new();
            let _a = bus.subscribe("evt", failing("boom")).unwrap();
            let _b = bus.subscribe("evt", good.handler.clone()).unwrap();

            assert!(bus.publish("evt", json!(1)).is_ok());
            assert_eq!(good.count(), 1);
        }
    }

    #[test]
    fn test_development_logs_one_line_per_failed_subscriber() {
        let bus = instrumented_bus(&config_from(&[("CROSSTALK_ENV", "development")]));
        let good = Recorder::new();
        let _a = bus.subscribe_state("cart:items", failing("sync lost")).unwrap();
        let _b = bus.subscribe_state("cart:items", good.handler.clone()).unwrap();

        let (result, logs) = LogCapture::run(|| bus.set_state("cart:items", json!([1, 2])));

        assert!(result.is_ok());
        assert_eq!(good.values(), vec![json!([1, 2])]);
        let lines = logs.lines_containing("Error in subscriber");
        assert_eq!(lines.len(), 1, "captured: {lines:?}");
        assert!(lines[0].contains("channel=state"));
        assert!(lines[0].contains("cart:items"));
        assert!(lines[0].contains("sync lost"));
    }

    #[test]
    fn test_production_failures_are_silent() {
        let bus = instrumented_bus(&config_from(&[("CROSSTALK_ENV", "production")]));
        let good = Recorder::new();
        let _a = bus.subscribe("cart:add", failing("sync lost")).unwrap();
        let _b = bus.subscribe("cart:add", good.handler.clone()).unwrap();

        let (result, logs) = LogCapture::run(|| bus.publish("cart:add", json!({"sku": 7})));

        assert!(result.is_ok());
        assert_eq!(good.count(), 1);
        assert!(logs.lines_containing("Error in subscriber").is_empty());
        assert!(logs.lines_containing("sync lost").is_empty());
    }

    #[test]
    fn test_metrics_follow_bus_activity() {
        register_metrics().unwrap();
        let bus = instrumented_bus(&config_from(&[("CROSSTALK_SERVICE_NAME", "metrics-it")]));
        let invocations = HANDLER_INVOCATIONS.with_label_values(&["event"]).get();
        let failures = SUBSCRIBER_FAILURES.with_label_values(&["event"]).get();

        let _a = bus.subscribe("metrics-it", failing("counted")).unwrap();
        let _b = bus.subscribe("metrics-it", Recorder::new().handler).unwrap();
        bus.publish("metrics-it", json!(1)).unwrap();

        assert!(HANDLER_INVOCATIONS.with_label_values(&["event"]).get() - invocations >= 2.0);
        assert!(SUBSCRIBER_FAILURES.with_label_values(&["event"]).get() - failures >= 1.0);
        assert!(encode_metrics()
            .unwrap()
            .contains("crosstalk_handler_invocations_total"));
    }

    #[test]
    fn test_plain_bus_reports_nothing() {
        let before = SUBSCRIBER_FAILURES.with_label_values(&["lifecycle"]).get();
        let bus = CrossTalk::new();
        let _sub = bus.subscribe_lifecycle(
            crosstalk::Handler::new(|_: &crosstalk::LifecycleEvent| {
                Err(anyhow::anyhow!("ignored"))
            }),
            crosstalk::LifecycleSubscribeOptions::default(),
        );
        bus.announce_available("plain", None).unwrap();

        // Other tests may touch this counter concurrently, but never on the
        // lifecycle channel.
        assert_eq!(
            SUBSCRIBER_FAILURES.with_label_values(&["lifecycle"]).get(),
            before
        );
    }
}
