//! # Event Bus
//!
//! Named-topic publish/subscribe. Topics need no declaration: subscribing
//! creates one, and it disappears when its last subscriber leaves.

use crate::delivery::{Channel, Diagnostics};
use crate::error::BusError;
use crate::handler::EventHandler;
use crate::registry::KeyedSubscribers;
use crate::subscription::Subscription;
use crate::validation::{validate_identifier, IdentifierKind};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Topic registry with synchronous fan-out.
#[derive(Debug)]
pub struct EventBus {
    topics: Arc<RwLock<KeyedSubscribers<Value>>>,
    diagnostics: Diagnostics,
}

impl EventBus {
    pub(crate) fn new(diagnostics: Diagnostics) -> Self {
        Self {
            topics: Arc::new(RwLock::new(KeyedSubscribers::new())),
            diagnostics,
        }
    }

    /// Deliver `payload` to every current subscriber of `name`, in
    /// subscription order. Returns once all of them have run.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidIdentifier` if `name` is blank.
    pub fn publish(&self, name: &str, payload: Value) -> Result<(), BusError> {
        validate_identifier(name, IdentifierKind::EventName)?;

        let snapshot = self.topics.read().snapshot(name);
        if snapshot.is_empty() {
            debug!(event = name, "Event published with no subscribers");
            return Ok(());
        }

        self.diagnostics
            .deliver(Channel::Event, name, &snapshot, &payload);
        Ok(())
    }

    /// Register `handler` for `name`. Subscribing the same handler twice
    /// keeps a single registration.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidIdentifier` if `name` is blank.
    pub fn subscribe(&self, name: &str, handler: EventHandler) -> Result<Subscription, BusError> {
        validate_identifier(name, IdentifierKind::EventName)?;

        let added = self.topics.write().insert(name, handler.clone());
        debug!(event = name, added, "Event subscription registered");

        let topics = Arc::downgrade(&self.topics);
        let topic = name.to_string();
        Ok(Subscription::new(format!("event:{name}"), move || {
            remove_from(&topics, &topic, &handler);
        }))
    }

    /// Remove `handler` from `name`. Unknown topics and handlers are ignored.
    pub fn unsubscribe(&self, name: &str, handler: &EventHandler) {
        let removed = self.topics.write().remove(name, handler);
        if removed {
            debug!(event = name, "Event subscription removed");
        }
    }

    /// Number of handlers registered for `name`.
    #[must_use]
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.topics.read().subscriber_count(name)
    }

    /// Number of topics with at least one subscriber.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.read().key_count()
    }

    pub(crate) fn clear(&self) {
        self.topics.write().clear();
    }
}

fn remove_from(topics: &Weak<RwLock<KeyedSubscribers<Value>>>, name: &str, handler: &EventHandler) {
    if let Some(topics) = topics.upgrade() {
        topics.write().remove(name, handler);
    }
}
