//! # CrossTalk Bus Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | `publish` fan-out, 1-100 subscribers | linear in subscriber count |
//! | `set_state` with watchers | same cost as publish plus one map write |
//! | scoped `publish` | one extra string format over root publish |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use crosstalk::{CrossTalk, Handler, MessageBus};
use serde_json::{json, Value};
use std::time::Duration;

fn noop() -> Handler<Value> {
    Handler::new(|payload: &Value| {
        black_box(payload);
        Ok(())
    })
}

fn bench_publish_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish-fan-out");
    group.measurement_time(Duration::from_secs(5));

    for subscribers in [1usize, 10, 100] {
        let bus = CrossTalk::new();
        let _subs: Vec<_> = (0..subscribers)
            .map(|_| bus.subscribe("bench:event", noop()).unwrap())
            .collect();
        let payload = json!({"userId": "123", "items": [1, 2, 3]});

        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_with_input(
            BenchmarkId::new("publish", subscribers),
            &subscribers,
            |b, _| b.iter(|| bus.publish("bench:event", black_box(payload.clone())).unwrap()),
        );
    }

    group.finish();
}

fn bench_state_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("state-writes");

    let bus = CrossTalk::new();
    let _subs: Vec<_> = (0..10)
        .map(|_| bus.subscribe_state("bench:state", noop()).unwrap())
        .collect();

    group.bench_function("set_state_10_watchers", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            bus.set_state("bench:state", json!(i)).unwrap();
        })
    });

    group.bench_function("get_state", |b| {
        b.iter(|| black_box(bus.get_state("bench:state").unwrap()))
    });

    group.finish();
}

fn bench_scoped_publish(c: &mut Criterion) {
    let bus = CrossTalk::new();
    let scope = bus.scope("bench").unwrap();
    let _sub = scope.subscribe("event", noop()).unwrap();

    c.bench_function("scoped_publish", |b| {
        b.iter(|| scope.publish("event", json!(1)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_publish_fan_out,
    bench_state_writes,
    bench_scoped_publish
);
criterion_main!(benches);
