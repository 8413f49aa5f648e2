//! # Shared State Store
//!
//! Keyed last-value store with change notification. A key that was never
//! written reads as `None`; a key written with JSON null reads as
//! `Some(Value::Null)`.
//!
//! Subscribing to a key that already holds a value replays that value to
//! the new handler before `subscribe_state` returns, so a module that loads
//! late still observes state set before it arrived.

use crate::delivery::{Channel, Diagnostics};
use crate::error::BusError;
use crate::handler::StateHandler;
use crate::registry::KeyedSubscribers;
use crate::subscription::Subscription;
use crate::validation::{validate_identifier, IdentifierKind};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Last-value store plus per-key subscribers.
#[derive(Debug)]
pub struct StateStore {
    values: RwLock<HashMap<String, Value>>,
    subscribers: Arc<RwLock<KeyedSubscribers<Value>>>,
    diagnostics: Diagnostics,
}

impl StateStore {
    pub(crate) fn new(diagnostics: Diagnostics) -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            subscribers: Arc::new(RwLock::new(KeyedSubscribers::new())),
            diagnostics,
        }
    }

    /// Store `value` under `key`, then notify the key's subscribers.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidIdentifier` if `key` is blank.
    pub fn set_state(&self, key: &str, value: Value) -> Result<(), BusError> {
        validate_identifier(key, IdentifierKind::StateKey)?;

        self.values.write().insert(key.to_string(), value.clone());

        let snapshot = self.subscribers.read().snapshot(key);
        if !snapshot.is_empty() {
            self.diagnostics
                .deliver(Channel::State, key, &snapshot, &value);
        }
        Ok(())
    }

    /// Current value of `key`, if it was ever written.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidIdentifier` if `key` is blank.
    pub fn get_state(&self, key: &str) -> Result<Option<Value>, BusError> {
        validate_identifier(key, IdentifierKind::StateKey)?;
        Ok(self.values.read().get(key).cloned())
    }

    /// Watch `key` for changes. If a value is already stored, `handler` is
    /// invoked once with it before this returns.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidIdentifier` if `key` is blank.
    pub fn subscribe_state(
        &self,
        key: &str,
        handler: StateHandler,
    ) -> Result<Subscription, BusError> {
        validate_identifier(key, IdentifierKind::StateKey)?;

        let added = self.subscribers.write().insert(key, handler.clone());
        debug!(key = key, added, "State subscription registered");

        let current = self.values.read().get(key).cloned();
        if let Some(current) = current {
            self.diagnostics.deliver(
                Channel::StateReplay,
                key,
                std::slice::from_ref(&handler),
                &current,
            );
        }

        let subscribers = Arc::downgrade(&self.subscribers);
        let state_key = key.to_string();
        Ok(Subscription::new(format!("state:{key}"), move || {
            if let Some(subscribers) = subscribers.upgrade() {
                subscribers.write().remove(&state_key, &handler);
            }
        }))
    }

    /// Stop watching `key`. Unknown keys and handlers are ignored.
    pub fn unsubscribe_state(&self, key: &str, handler: &StateHandler) {
        if self.subscribers.write().remove(key, handler) {
            debug!(key = key, "State subscription removed");
        }
    }

    /// Number of keys currently holding a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether no key holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Number of handlers watching `key`.
    #[must_use]
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.subscribers.read().subscriber_count(key)
    }

    pub(crate) fn clear(&self) {
        self.values.write().clear();
        self.subscribers.write().clear();
    }
}
