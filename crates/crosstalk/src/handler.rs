//! # Subscriber Handlers
//!
//! A `Handler<T>` is a shared, reference-counted callback. Identity is the
//! allocation: clones of one handler are the same registration, while two
//! handlers built from identical closures are distinct. This identity is
//! what the registries deduplicate and unsubscribe by.

use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

use crate::lifecycle::LifecycleEvent;

/// Return type of every subscriber callback.
pub type HandlerResult = anyhow::Result<()>;

type Callback<T> = dyn Fn(&T) -> HandlerResult + Send + Sync;

/// Subscriber callback with identity semantics.
pub struct Handler<T> {
    callback: Arc<Callback<T>>,
}

/// Handler for named events.
pub type EventHandler = Handler<Value>;

/// Handler for state changes.
pub type StateHandler = Handler<Value>;

/// Handler for availability transitions.
pub type LifecycleHandler = Handler<LifecycleEvent>;

impl<T> Handler<T> {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&T) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Whether `other` is the same registration as `self`.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        // Compare data pointers only; vtable addresses are not stable.
        std::ptr::eq(
            Arc::as_ptr(&self.callback).cast::<()>(),
            Arc::as_ptr(&other.callback).cast::<()>(),
        )
    }

    /// Invoke the callback, converting both error returns and panics into
    /// a `SubscriberFailure`.
    pub(crate) fn invoke(&self, arg: &T) -> Result<(), SubscriberFailure> {
        match catch_unwind(AssertUnwindSafe(|| (self.callback)(arg))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(SubscriberFailure::Returned(format!("{err:#}"))),
            Err(panic) => Err(SubscriberFailure::Panicked(panic_message(panic.as_ref()))),
        }
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Why a single subscriber invocation failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriberFailure {
    /// The handler returned an error.
    #[error("subscriber returned error: {0}")]
    Returned(String),

    /// The handler panicked.
    #[error("subscriber panicked: {0}")]
    Panicked(String),
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
