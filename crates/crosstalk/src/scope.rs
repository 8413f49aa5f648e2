//! # Namespace Scopes
//!
//! A scope is a view of the root bus that prefixes every event name and
//! state key with `"<namespace>:"`. Two scopes with different namespaces can
//! use the same names without colliding, and the root can still reach any
//! scoped entry through its fully qualified name.
//!
//! ```text
//!   scope("auth").publish("login")          -> root event  "auth:login"
//!   scope("auth").scope("oauth").set_state("token")
//!                                           -> root state  "auth:oauth:token"
//! ```
//!
//! Lifecycle and version operations pass through unchanged: module
//! availability is process-wide. `destroy` is refused on a scope.

use crate::bus::{CrossTalk, MessageBus};
use crate::error::BusError;
use crate::handler::{EventHandler, LifecycleHandler, StateHandler};
use crate::lifecycle::{AvailableModule, LifecycleSubscribeOptions, Metadata};
use crate::subscription::Subscription;
use crate::validation::{validate_identifier, IdentifierKind};
use crate::version::DeliveryMode;
use serde_json::Value;
use tracing::warn;

/// Separator between namespace segments and the scoped name.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Namespaced view of a root bus.
#[derive(Clone, Debug)]
pub struct Scope {
    root: CrossTalk,
    namespace: String,
}

impl Scope {
    pub(crate) fn new(root: CrossTalk, namespace: String) -> Self {
        Self { root, namespace }
    }

    /// Full prefix of this scope, e.g. `"auth:oauth"`.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The root bus this scope writes through to.
    #[must_use]
    pub fn root(&self) -> &CrossTalk {
        &self.root
    }

    /// Fully qualified name for `name` inside this scope.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidIdentifier` if `name` is blank. The check runs on
    /// the unprefixed name.
    pub fn qualify(&self, name: &str, kind: IdentifierKind) -> Result<String, BusError> {
        validate_identifier(name, kind)?;
        Ok(format!("{}{NAMESPACE_SEPARATOR}{name}", self.namespace))
    }
}

impl MessageBus for Scope {
    fn publish(&self, name: &str, payload: Value) -> Result<(), BusError> {
        let name = self.qualify(name, IdentifierKind::EventName)?;
        self.root.publish(&name, payload)
    }

    fn subscribe(&self, name: &str, handler: EventHandler) -> Result<Subscription, BusError> {
        let name = self.qualify(name, IdentifierKind::EventName)?;
        self.root.subscribe(&name, handler)
    }

    fn unsubscribe(&self, name: &str, handler: &EventHandler) {
        let name = format!("{}{NAMESPACE_SEPARATOR}{name}", self.namespace);
        self.root.unsubscribe(&name, handler);
    }

    fn set_state(&self, key: &str, value: Value) -> Result<(), BusError> {
        let key = self.qualify(key, IdentifierKind::StateKey)?;
        self.root.set_state(&key, value)
    }

    fn get_state(&self, key: &str) -> Result<Option<Value>, BusError> {
        let key = self.qualify(key, IdentifierKind::StateKey)?;
        self.root.get_state(&key)
    }

    fn subscribe_state(&self, key: &str, handler: StateHandler) -> Result<Subscription, BusError> {
        let key = self.qualify(key, IdentifierKind::StateKey)?;
        self.root.subscribe_state(&key, handler)
    }

    fn unsubscribe_state(&self, key: &str, handler: &StateHandler) {
        let key = format!("{}{NAMESPACE_SEPARATOR}{key}", self.namespace);
        self.root.unsubscribe_state(&key, handler);
    }

    fn announce_available(&self, id: &str, metadata: Option<Metadata>) -> Result<(), BusError> {
        self.root.announce_available(id, metadata)
    }

    fn announce_unavailable(&self, id: &str) -> Result<(), BusError> {
        self.root.announce_unavailable(id)
    }

    fn subscribe_lifecycle(
        &self,
        handler: LifecycleHandler,
        options: LifecycleSubscribeOptions,
    ) -> Subscription {
        self.root.subscribe_lifecycle(handler, options)
    }

    fn unsubscribe_lifecycle(&self, handler: &LifecycleHandler) {
        self.root.unsubscribe_lifecycle(handler);
    }

    fn available(&self) -> Vec<String> {
        self.root.available()
    }

    fn available_with_metadata(&self) -> Vec<AvailableModule> {
        self.root.available_with_metadata()
    }

    fn is_available(&self, id: &str) -> Result<bool, BusError> {
        self.root.is_available(id)
    }

    fn api_version(&self) -> &str {
        self.root.api_version()
    }

    fn is_version_supported(&self, version: &str) -> bool {
        self.root.is_version_supported(version)
    }

    fn delivery_mode(&self) -> DeliveryMode {
        self.root.delivery_mode()
    }

    fn scope(&self, namespace: &str) -> Result<Scope, BusError> {
        let namespace = self.qualify(namespace, IdentifierKind::Namespace)?;
        Ok(Self::new(self.root.clone(), namespace))
    }

    fn destroy(&self) -> Result<(), BusError> {
        warn!(
            namespace = %self.namespace,
            "destroy() called on a scoped instance; ignoring"
        );
        Err(BusError::ScopedTeardown {
            namespace: self.namespace.clone(),
        })
    }
}
