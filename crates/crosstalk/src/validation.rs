//! # Identifier Validation
//!
//! Every event name, state key, module id, and namespace must contain at
//! least one non-whitespace character. Validation runs before any registry
//! is touched, so a rejected call has no side effects.

use crate::error::BusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role an identifier plays in a bus call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierKind {
    /// Topic name passed to publish/subscribe.
    EventName,
    /// Key in the shared state table.
    StateKey,
    /// Module id in the availability table.
    ModuleId,
    /// Namespace passed to `scope()`.
    Namespace,
}

impl IdentifierKind {
    /// Human readable label used in error messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::EventName => "Event name",
            Self::StateKey => "State key",
            Self::ModuleId => "Module identifier",
            Self::Namespace => "Namespace",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reject empty or whitespace-only identifiers.
///
/// # Errors
///
/// Returns `BusError::InvalidIdentifier` carrying `kind`.
pub fn validate_identifier(value: &str, kind: IdentifierKind) -> Result<(), BusError> {
    if value.trim().is_empty() {
        return Err(BusError::invalid(kind));
    }
    Ok(())
}
