//! # Multi-threaded Hosts
//!
//! The bus is `Send + Sync`; tasks on a multi-threaded runtime share one
//! instance. Delivery stays synchronous on whichever thread publishes.

#[cfg(test)]
mod tests {
    use crosstalk::{shared, release, CrossTalk, Handler, MessageBus};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_publishers_all_delivered() {
        let key = "concurrency-test-publish";
        let bus = shared(key, CrossTalk::new);
        let received = Arc::new(AtomicUsize::new(0));
        let counter = received.clone();
        let _sub = bus
            .subscribe(
                "tick",
                Handler::new(move |_: &Value| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();

        let tasks: Vec<_> = (0..8)
            .map(|task| {
                tokio::spawn(async move {
                    let bus = shared(key, CrossTalk::new);
                    for i in 0..100 {
                        bus.publish("tick", json!({"task": task, "i": i})).unwrap();
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(received.load(Ordering::SeqCst), 800);
        release(key);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_state_writers_last_value_visible() {
        let bus = CrossTalk::new();
        let tasks: Vec<_> = (0..4)
            .map(|task| {
                let bus = bus.clone();
                tokio::spawn(async move {
                    for i in 0..50 {
                        bus.set_state(&format!("worker-{task}"), json!(i)).unwrap();
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        for task in 0..4 {
            assert_eq!(
                bus.get_state(&format!("worker-{task}")).unwrap(),
                Some(json!(49))
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_subscribe_churn_during_publishing() {
        let bus = CrossTalk::new();
        let publisher = {
            let bus = bus.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    bus.publish("churn", json!(i)).unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };
        let churner = {
            let bus = bus.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let sub = bus
                        .subscribe("churn", Handler::new(|_: &Value| Ok(())))
                        .unwrap();
                    tokio::task::yield_now().await;
                    sub.unsubscribe();
                }
            })
        };

        publisher.await.unwrap();
        churner.await.unwrap();
        assert_eq!(bus.events().subscriber_count("churn"), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_lifecycle_from_blocking_tasks() {
        let bus = CrossTalk::new();
        let tasks: Vec<_> = (0..10)
            .map(|i| {
                let bus = bus.clone();
                tokio::task::spawn_blocking(move || {
                    bus.announce_available(&format!("module-{i}"), None).unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let mut ids = bus.available();
        ids.sort();
        assert_eq!(ids.len(), 10);
        assert!(bus.is_available("module-7").unwrap());
    }
}
