//! # Root Bus
//!
//! `CrossTalk` owns the four registries. It is a cheap `Clone` handle: every
//! clone refers to the same registries, which is how one instance is shared
//! by modules that never reference each other (see `crate::global`).
//!
//! `MessageBus` is the surface shared by the root and by namespace scopes.

use crate::config::BusConfig;
use crate::delivery::Diagnostics;
use crate::error::BusError;
use crate::events::EventBus;
use crate::handler::{EventHandler, LifecycleHandler, StateHandler};
use crate::lifecycle::{AvailableModule, LifecycleRegistry, LifecycleSubscribeOptions, Metadata};
use crate::observer::{BusObserver, NoopObserver};
use crate::scope::Scope;
use crate::state::StateStore;
use crate::subscription::Subscription;
use crate::validation::{validate_identifier, IdentifierKind};
use crate::version::{DeliveryMode, VersionGate};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Operations available on the root bus and on every scope.
///
/// Event names and state keys passed through a scope are prefixed with its
/// namespace. Lifecycle and version operations are never prefixed.
pub trait MessageBus: Send + Sync {
    /// Deliver `payload` to every subscriber of `name` before returning.
    fn publish(&self, name: &str, payload: Value) -> Result<(), BusError>;

    /// Register `handler` for `name`.
    fn subscribe(&self, name: &str, handler: EventHandler) -> Result<Subscription, BusError>;

    /// Remove `handler` from `name`, if registered.
    fn unsubscribe(&self, name: &str, handler: &EventHandler);

    /// Store `value` under `key` and notify the key's subscribers.
    fn set_state(&self, key: &str, value: Value) -> Result<(), BusError>;

    /// Current value of `key`, or `None` if never written.
    fn get_state(&self, key: &str) -> Result<Option<Value>, BusError>;

    /// Watch `key`; replays the current value first if one exists.
    fn subscribe_state(&self, key: &str, handler: StateHandler) -> Result<Subscription, BusError>;

    /// Stop watching `key`.
    fn unsubscribe_state(&self, key: &str, handler: &StateHandler);

    /// Mark module `id` available.
    fn announce_available(&self, id: &str, metadata: Option<Metadata>) -> Result<(), BusError>;

    /// Mark module `id` unavailable.
    fn announce_unavailable(&self, id: &str) -> Result<(), BusError>;

    /// Receive availability transitions.
    fn subscribe_lifecycle(
        &self,
        handler: LifecycleHandler,
        options: LifecycleSubscribeOptions,
    ) -> Subscription;

    /// Stop receiving availability transitions.
    fn unsubscribe_lifecycle(&self, handler: &LifecycleHandler);

    /// Ids of available modules.
    fn available(&self) -> Vec<String>;

    /// Available modules with metadata.
    fn available_with_metadata(&self) -> Vec<AvailableModule>;

    /// Whether module `id` is available.
    fn is_available(&self, id: &str) -> Result<bool, BusError>;

    /// Protocol version of the bus.
    fn api_version(&self) -> &str;

    /// Whether a module built against `version` can use this bus.
    fn is_version_supported(&self, version: &str) -> bool;

    /// Delivery contract of the bus.
    fn delivery_mode(&self) -> DeliveryMode;

    /// View of this bus with every event name and state key prefixed.
    fn scope(&self, namespace: &str) -> Result<Scope, BusError>;

    /// Clear every registry. Only valid on the root.
    fn destroy(&self) -> Result<(), BusError>;
}

struct BusInner {
    config: BusConfig,
    events: EventBus,
    state: StateStore,
    lifecycle: LifecycleRegistry,
    version: VersionGate,
}

/// The root bus instance.
#[derive(Clone)]
pub struct CrossTalk {
    inner: Arc<BusInner>,
}

impl CrossTalk {
    /// New bus with default configuration and empty registries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// New bus with `config`.
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        Self::with_observer(config, Arc::new(NoopObserver))
    }

    /// New bus reporting its activity to `observer`.
    #[must_use]
    pub fn with_observer(config: BusConfig, observer: Arc<dyn BusObserver>) -> Self {
        let diagnostics = Diagnostics::new(&config, observer);
        info!(
            bus = %config.name,
            diagnostics = config.diagnostics,
            api_version = crate::API_VERSION,
            "CrossTalk bus created"
        );
        Self {
            inner: Arc::new(BusInner {
                events: EventBus::new(diagnostics.clone()),
                state: StateStore::new(diagnostics.clone()),
                lifecycle: LifecycleRegistry::new(diagnostics),
                version: VersionGate::current(),
                config,
            }),
        }
    }

    /// Whether `a` and `b` are handles to the same bus.
    #[must_use]
    pub fn same_instance(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// Direct access to the event registry.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Direct access to the state store.
    #[must_use]
    pub fn state(&self) -> &StateStore {
        &self.inner.state
    }

    /// Direct access to the lifecycle registry.
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleRegistry {
        &self.inner.lifecycle
    }
}

impl Default for CrossTalk {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CrossTalk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossTalk")
            .field("name", &self.inner.config.name)
            .field("topics", &self.inner.events.topic_count())
            .field("state_keys", &self.inner.state.len())
            .field("available", &self.inner.lifecycle.available())
            .finish()
    }
}

impl MessageBus for CrossTalk {
    fn publish(&self, name: &str, payload: Value) -> Result<(), BusError> {
        self.inner.events.publish(name, payload)
    }

    fn subscribe(&self, name: &str, handler: EventHandler) -> Result<Subscription, BusError> {
        self.inner.events.subscribe(name, handler)
    }

    fn unsubscribe(&self, name: &str, handler: &EventHandler) {
        self.inner.events.unsubscribe(name, handler);
    }

    fn set_state(&self, key: &str, value: Value) -> Result<(), BusError> {
        self.inner.state.set_state(key, value)
    }

    fn get_state(&self, key: &str) -> Result<Option<Value>, BusError> {
        self.inner.state.get_state(key)
    }

    fn subscribe_state(&self, key: &str, handler: StateHandler) -> Result<Subscription, BusError> {
        self.inner.state.subscribe_state(key, handler)
    }

    fn unsubscribe_state(&self, key: &str, handler: &StateHandler) {
        self.inner.state.unsubscribe_state(key, handler);
    }

    fn announce_available(&self, id: &str, metadata: Option<Metadata>) -> Result<(), BusError> {
        self.inner.lifecycle.announce_available(id, metadata)
    }

    fn announce_unavailable(&self, id: &str) -> Result<(), BusError> {
        self.inner.lifecycle.announce_unavailable(id)
    }

    fn subscribe_lifecycle(
        &self,
        handler: LifecycleHandler,
        options: LifecycleSubscribeOptions,
    ) -> Subscription {
        self.inner.lifecycle.subscribe_lifecycle(handler, options)
    }

    fn unsubscribe_lifecycle(&self, handler: &LifecycleHandler) {
        self.inner.lifecycle.unsubscribe_lifecycle(handler);
    }

    fn available(&self) -> Vec<String> {
        self.inner.lifecycle.available()
    }

    fn available_with_metadata(&self) -> Vec<AvailableModule> {
        self.inner.lifecycle.available_with_metadata()
    }

    fn is_available(&self, id: &str) -> Result<bool, BusError> {
        self.inner.lifecycle.is_available(id)
    }

    fn api_version(&self) -> &str {
        self.inner.version.api_version()
    }

    fn is_version_supported(&self, version: &str) -> bool {
        self.inner.version.is_supported(version)
    }

    fn delivery_mode(&self) -> DeliveryMode {
        self.inner.version.delivery_mode()
    }

    fn scope(&self, namespace: &str) -> Result<Scope, BusError> {
        validate_identifier(namespace, IdentifierKind::Namespace)?;
        Ok(Scope::new(self.clone(), namespace.to_string()))
    }

    fn destroy(&self) -> Result<(), BusError> {
        self.inner.events.clear();
        self.inner.state.clear();
        self.inner.lifecycle.clear();
        info!(bus = %self.inner.config.name, "CrossTalk bus destroyed");
        Ok(())
    }
}
