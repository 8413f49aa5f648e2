//! Cross-module integration scenarios.

pub mod concurrency;
pub mod namespaces;
pub mod telemetry;
