//! Subscriber bookkeeping shared by the event, state and lifecycle registries.

use crate::handler::Handler;
use std::collections::HashMap;

/// Insertion-ordered set of handlers, deduplicated by handler identity.
#[derive(Debug)]
pub(crate) struct SubscriberSet<T> {
    handlers: Vec<Handler<T>>,
}

impl<T> SubscriberSet<T> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler. Returns `false` if it was already registered.
    pub(crate) fn insert(&mut self, handler: Handler<T>) -> bool {
        if self.handlers.iter().any(|h| h.same_as(&handler)) {
            return false;
        }
        self.handlers.push(handler);
        true
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub(crate) fn remove(&mut self, handler: &Handler<T>) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|h| !h.same_as(handler));
        self.handlers.len() != before
    }

    /// Point-in-time copy used for delivery.
    pub(crate) fn snapshot(&self) -> Vec<Handler<T>> {
        self.handlers.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.handlers.clear();
    }
}

/// Handler sets keyed by topic or state key. Empty sets are pruned.
#[derive(Debug)]
pub(crate) struct KeyedSubscribers<T> {
    sets: HashMap<String, SubscriberSet<T>>,
}

impl<T> KeyedSubscribers<T> {
    pub(crate) fn new() -> Self {
        Self {
            sets: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: &str, handler: Handler<T>) -> bool {
        self.sets
            .entry(key.to_string())
            .or_insert_with(SubscriberSet::new)
            .insert(handler)
    }

    pub(crate) fn remove(&mut self, key: &str, handler: &Handler<T>) -> bool {
        let Some(set) = self.sets.get_mut(key) else {
            return false;
        };
        let removed = set.remove(handler);
        if set.is_empty() {
            self.sets.remove(key);
        }
        removed
    }

    /// Snapshot of the handlers for `key`; empty when nobody listens.
    pub(crate) fn snapshot(&self, key: &str) -> Vec<Handler<T>> {
        self.sets
            .get(key)
            .map(SubscriberSet::snapshot)
            .unwrap_or_default()
    }

    pub(crate) fn subscriber_count(&self, key: &str) -> usize {
        self.sets.get(key).map_or(0, SubscriberSet::len)
    }

    pub(crate) fn key_count(&self) -> usize {
        self.sets.len()
    }

    pub(crate) fn clear(&mut self) {
        self.sets.clear();
    }
}
