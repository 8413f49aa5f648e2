//! # Lifecycle Registry
//!
//! Tracks which modules are currently available and broadcasts every
//! availability transition. Lifecycle is process-wide: namespace scopes
//! forward to this registry unchanged.
//!
//! ## Transitions
//!
//! ```text
//!   announce_available(id)          announce_unavailable(id)
//!  ───────────────────────► [available] ───────────────────────► (absent)
//!         │                     ▲
//!         └─ re-announce: ──────┘  metadata replaced, event re-broadcast
//! ```
//!
//! `announce_unavailable` for an id that is not present broadcasts nothing.

use crate::delivery::{Channel, Diagnostics};
use crate::error::BusError;
use crate::handler::LifecycleHandler;
use crate::registry::SubscriberSet;
use crate::subscription::Subscription;
use crate::validation::{validate_identifier, IdentifierKind};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Opaque metadata announced alongside a module id.
pub type Metadata = serde_json::Map<String, Value>;

/// Availability of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    Available,
    Unavailable,
}

impl LifecycleStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broadcast payload for availability transitions.
///
/// `metadata` is present only for `Available`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub id: String,
    pub status: LifecycleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl LifecycleEvent {
    /// `Available` transition carrying `metadata`.
    #[must_use]
    pub fn available(id: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            status: LifecycleStatus::Available,
            metadata: Some(metadata),
        }
    }

    /// `Unavailable` transition.
    #[must_use]
    pub fn unavailable(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: LifecycleStatus::Unavailable,
            metadata: None,
        }
    }
}

/// A currently available module and its announced metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableModule {
    pub id: String,
    pub metadata: Metadata,
}

/// Options for `subscribe_lifecycle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleSubscribeOptions {
    /// Replay an `Available` event for every module already present.
    pub include_current_state: bool,
}

impl LifecycleSubscribeOptions {
    /// Options that replay current availability on subscribe.
    #[must_use]
    pub fn with_current_state() -> Self {
        Self {
            include_current_state: true,
        }
    }
}

/// Insertion-ordered availability table.
///
/// Re-announcing keeps an id in place; removing and re-adding moves it to
/// the end.
#[derive(Debug, Default)]
struct AvailabilityTable {
    entries: Vec<AvailableModule>,
}

impl AvailabilityTable {
    fn upsert(&mut self, id: &str, metadata: Metadata) {
        match self.entries.iter_mut().find(|m| m.id == id) {
            Some(existing) => existing.metadata = metadata,
            None => self.entries.push(AvailableModule {
                id: id.to_string(),
                metadata,
            }),
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|m| m.id != id);
        self.entries.len() != before
    }

    fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|m| m.id == id)
    }
}

/// Global availability registry.
#[derive(Debug)]
pub struct LifecycleRegistry {
    available: RwLock<AvailabilityTable>,
    subscribers: Arc<RwLock<SubscriberSet<LifecycleEvent>>>,
    diagnostics: Diagnostics,
}

impl LifecycleRegistry {
    pub(crate) fn new(diagnostics: Diagnostics) -> Self {
        Self {
            available: RwLock::new(AvailabilityTable::default()),
            subscribers: Arc::new(RwLock::new(SubscriberSet::new())),
            diagnostics,
        }
    }

    /// Mark `id` available. Missing metadata is stored as an empty map.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidIdentifier` if `id` is blank.
    pub fn announce_available(&self, id: &str, metadata: Option<Metadata>) -> Result<(), BusError> {
        validate_identifier(id, IdentifierKind::ModuleId)?;

        let metadata = metadata.unwrap_or_default();
        self.available.write().upsert(id, metadata.clone());
        info!(module = id, "Module available");

        self.broadcast(&LifecycleEvent::available(id, metadata));
        Ok(())
    }

    /// Mark `id` unavailable. A module that was never announced (or was
    /// already withdrawn) produces no broadcast.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidIdentifier` if `id` is blank.
    pub fn announce_unavailable(&self, id: &str) -> Result<(), BusError> {
        validate_identifier(id, IdentifierKind::ModuleId)?;

        if !self.available.write().remove(id) {
            debug!(module = id, "Unavailable announcement for unknown module ignored");
            return Ok(());
        }
        info!(module = id, "Module unavailable");

        self.broadcast(&LifecycleEvent::unavailable(id));
        Ok(())
    }

    /// Receive every future availability transition. With
    /// `include_current_state`, an `Available` event for each module already
    /// present is delivered first, in table order.
    pub fn subscribe_lifecycle(
        &self,
        handler: LifecycleHandler,
        options: LifecycleSubscribeOptions,
    ) -> Subscription {
        let added = self.subscribers.write().insert(handler.clone());
        debug!(added, replay = options.include_current_state, "Lifecycle subscription registered");

        if options.include_current_state {
            for module in self.available_with_metadata() {
                let event = LifecycleEvent::available(module.id, module.metadata);
                self.diagnostics.deliver(
                    Channel::LifecycleReplay,
                    &event.id,
                    std::slice::from_ref(&handler),
                    &event,
                );
            }
        }

        let subscribers = Arc::downgrade(&self.subscribers);
        Subscription::new("lifecycle".to_string(), move || {
            if let Some(subscribers) = subscribers.upgrade() {
                subscribers.write().remove(&handler);
            }
        })
    }

    /// Stop receiving transitions. Unknown handlers are ignored.
    pub fn unsubscribe_lifecycle(&self, handler: &LifecycleHandler) {
        if self.subscribers.write().remove(handler) {
            debug!("Lifecycle subscription removed");
        }
    }

    /// Ids of every available module, in announcement order.
    #[must_use]
    pub fn available(&self) -> Vec<String> {
        self.available
            .read()
            .entries
            .iter()
            .map(|m| m.id.clone())
            .collect()
    }

    /// Every available module with its metadata, in announcement order.
    #[must_use]
    pub fn available_with_metadata(&self) -> Vec<AvailableModule> {
        self.available.read().entries.clone()
    }

    /// Whether `id` is currently available.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidIdentifier` if `id` is blank. Unknown ids are
    /// simply `false`.
    pub fn is_available(&self, id: &str) -> Result<bool, BusError> {
        validate_identifier(id, IdentifierKind::ModuleId)?;
        Ok(self.available.read().contains(id))
    }

    /// Number of lifecycle subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    pub(crate) fn clear(&self) {
        self.available.write().entries.clear();
        self.subscribers.write().clear();
    }

    fn broadcast(&self, event: &LifecycleEvent) {
        self.diagnostics.observer().on_lifecycle(event);

        let snapshot = self.subscribers.read().snapshot();
        if !snapshot.is_empty() {
            self.diagnostics
                .deliver(Channel::Lifecycle, &event.id, &snapshot, event);
        }
    }
}
