//! # Process-Wide Instances
//!
//! Independently loaded modules find one another by resolving the same bus
//! through a well-known key. The first resolver creates the instance; every
//! later resolver gets a handle to it.
//!
//! ```text
//!   module A ──┐
//!   module B ──┼── shared("__crossTalkSingleton__") ──► one CrossTalk
//!   module C ──┘
//! ```
//!
//! The table is a `static` of this crate, so it is shared by everything
//! linked against the same compiled copy of `crosstalk`.

use crate::bus::CrossTalk;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};

/// Key under which `global()` stores the default instance.
pub const GLOBAL_KEY: &str = "__crossTalkSingleton__";

lazy_static! {
    static ref INSTANCES: RwLock<HashMap<String, CrossTalk>> = RwLock::new(HashMap::new());
}

/// Resolve the instance stored under `key`, creating it with `init` if this
/// is the first call for that key. `init` runs at most once per key and
/// must not resolve instances itself.
pub fn shared<F>(key: &str, init: F) -> CrossTalk
where
    F: FnOnce() -> CrossTalk,
{
    if let Some(existing) = INSTANCES.read().get(key) {
        return existing.clone();
    }

    let mut instances = INSTANCES.write();
    instances
        .entry(key.to_string())
        .or_insert_with(|| {
            info!(key = key, "Creating shared bus instance");
            init()
        })
        .clone()
}

/// The default process-wide bus.
#[must_use]
pub fn global() -> CrossTalk {
    shared(GLOBAL_KEY, CrossTalk::new)
}

/// Place `bus` under `key` unless an instance already lives there. Returns
/// whichever instance is resident afterwards.
pub fn install(key: &str, bus: CrossTalk) -> CrossTalk {
    let mut instances = INSTANCES.write();
    if let Some(existing) = instances.get(key) {
        debug!(key = key, "Instance already installed; keeping resident bus");
        return existing.clone();
    }
    instances.insert(key.to_string(), bus.clone());
    info!(key = key, "Installed shared bus instance");
    bus
}

/// Forget the instance under `key`. Existing handles keep working; the next
/// `shared` call creates a fresh instance.
pub fn release(key: &str) -> Option<CrossTalk> {
    let removed = INSTANCES.write().remove(key);
    if removed.is_some() {
        debug!(key = key, "Released shared bus instance");
    }
    removed
}
