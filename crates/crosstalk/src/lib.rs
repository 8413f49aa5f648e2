//! # CrossTalk - In-Process Bus for Independently Loaded Modules
//!
//! Modules that are built and loaded separately coordinate through one
//! shared bus instead of referencing each other directly.
//!
//! ## Channels
//!
//! - **Events:** named topics, synchronous fan-out to every subscriber
//! - **State:** keyed last-value store; late subscribers get the current value
//! - **Lifecycle:** module availability announcements and discovery
//!
//! ```text
//! ┌──────────┐   publish / set_state    ┌───────────────┐
//! │ Module A │ ───────────────────────► │   CrossTalk   │
//! └──────────┘                          │               │
//!                                       │ events        │   handler(payload)
//! ┌──────────┐   subscribe / replay     │ state         │ ─────────────────►
//! │ Module B │ ◄─────────────────────── │ lifecycle     │
//! └──────────┘                          └───────────────┘
//!                                               ▲
//!                     global() / shared(key) ───┘
//! ```
//!
//! ## Guarantees
//!
//! - Every handler has run before `publish` or `set_state` returns
//! - A failing or panicking handler never affects the publisher or its peers
//! - Handlers may publish and (un)subscribe re-entrantly
//! - Blank identifiers are rejected before anything is mutated
//!
//! ## Example
//!
//! ```rust
//! use crosstalk::{CrossTalk, Handler, MessageBus};
//! use serde_json::json;
//!
//! let bus = CrossTalk::new();
//! bus.set_state("theme", json!("dark")).unwrap();
//!
//! let _sub = bus
//!     .subscribe_state("theme", Handler::new(|value: &serde_json::Value| {
//!         println!("theme is {value}");
//!         Ok(())
//!     }))
//!     .unwrap();
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod config;
pub mod delivery;
pub mod error;
pub mod events;
pub mod global;
pub mod handler;
pub mod lifecycle;
pub mod observer;
mod registry;
pub mod scope;
pub mod state;
pub mod subscription;
pub mod typed;
pub mod validation;
pub mod version;

// Re-export main types
pub use bus::{CrossTalk, MessageBus};
pub use config::{BusConfig, DEFAULT_BUS_NAME};
pub use delivery::{Channel, DeliveryReport};
pub use error::BusError;
pub use events::EventBus;
pub use global::{global, install, release, shared, GLOBAL_KEY};
pub use handler::{
    EventHandler, Handler, HandlerResult, LifecycleHandler, StateHandler, SubscriberFailure,
};
pub use lifecycle::{
    AvailableModule, LifecycleEvent, LifecycleRegistry, LifecycleStatus,
    LifecycleSubscribeOptions, Metadata,
};
pub use observer::{BusObserver, NoopObserver};
pub use scope::{Scope, NAMESPACE_SEPARATOR};
pub use state::StateStore;
pub use subscription::Subscription;
pub use typed::MessageBusExt;
pub use validation::{validate_identifier, IdentifierKind};
pub use version::{DeliveryMode, VersionGate, API_VERSION};
