//! # Subscription Handle
//!
//! Returned by every subscribe call. Calling `unsubscribe()` removes exactly
//! the registration that produced it; later calls are no-ops.
//!
//! Unlike a RAII guard, dropping a `Subscription` leaves the handler
//! registered. Modules that subscribe for their whole lifetime can simply
//! discard the handle.

use parking_lot::Mutex;
use std::fmt;
use tracing::debug;

type Cancel = Box<dyn FnOnce() + Send>;

/// Capability to undo one registration.
pub struct Subscription {
    label: String,
    cancel: Mutex<Option<Cancel>>,
}

impl Subscription {
    pub(crate) fn new(label: String, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            label,
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// Remove the registration. Idempotent.
    pub fn unsubscribe(&self) {
        // Take first so the registry call runs without our lock held.
        let cancel = self.cancel.lock().take();
        if let Some(cancel) = cancel {
            cancel();
            debug!(subscription = %self.label, "Subscription cancelled");
        }
    }

    /// Whether `unsubscribe()` has not been called yet.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.lock().is_some()
    }

    /// What this subscription is attached to, e.g. `event:cart:updated`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .field("active", &self.is_active())
            .finish()
    }
}
