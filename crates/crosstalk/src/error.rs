//! Error types for bus operations.

use crate::validation::IdentifierKind;
use thiserror::Error;

/// Errors returned at the bus call boundary.
///
/// Subscriber failures never surface here: they are isolated per handler
/// during fan-out and reported through diagnostics and the observer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// An event name, state key, module id, or namespace was empty or
    /// whitespace-only. Nothing was mutated.
    #[error("{kind} must be a non-empty string.")]
    InvalidIdentifier { kind: IdentifierKind },

    /// `destroy()` was called through a namespace scope.
    #[error(
        "destroy() should only be called on the root CrossTalk instance, \
         not on scoped instance \"{namespace}\""
    )]
    ScopedTeardown { namespace: String },

    /// A typed payload could not be converted to or from a bus value.
    #[error("Payload serialization failed: {0}")]
    Serialization(String),

    /// A protocol version string did not have the `major.minor.patch` shape.
    #[error("Invalid protocol version: \"{0}\"")]
    InvalidVersion(String),
}

impl BusError {
    /// Shorthand for an identifier validation failure.
    #[must_use]
    pub fn invalid(kind: IdentifierKind) -> Self {
        Self::InvalidIdentifier { kind }
    }

    /// Whether this error came from identifier validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidIdentifier { .. })
    }
}

impl From<serde_json::Error> for BusError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
