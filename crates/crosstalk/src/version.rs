//! # Version Gate
//!
//! Lets a module check, at load time, whether the bus it found speaks a
//! protocol it was built against.
//!
//! ## Compatibility Policy
//!
//! | Candidate vs current | Supported |
//! |----------------------|-----------|
//! | exact match | yes |
//! | both majors are `0` | yes (pre-1.0 is permissive) |
//! | same major, candidate minor <= current minor | yes |
//! | anything else, or unparseable | no |
//!
//! Accepted syntax is `major.minor.patch` (ASCII digits, leading zeros
//! allowed) with an optional `-suffix` made of ASCII letters, digits, `_`
//! and `.`. The suffix plays no part in the comparison. Build metadata
//! (`+...`) and hyphens inside the suffix are rejected.

use crate::error::BusError;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol version of this bus.
pub const API_VERSION: &str = "0.1.0";

/// How fan-out relates to the publishing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Every subscriber has run before `publish`/`set_state` returns.
    #[serde(rename = "sync")]
    Synchronous,
    /// Delivery may complete after the call returns.
    #[serde(rename = "async")]
    Asynchronous,
}

impl DeliveryMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synchronous => "sync",
            Self::Asynchronous => "async",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compatibility check against a fixed current version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGate {
    raw: String,
    current: Version,
}

impl VersionGate {
    /// Gate for this crate's `API_VERSION`.
    #[must_use]
    pub fn current() -> Self {
        Self {
            raw: API_VERSION.to_string(),
            current: Version::new(0, 1, 0),
        }
    }

    /// Gate for an arbitrary current version.
    ///
    /// # Errors
    ///
    /// `BusError::InvalidVersion` if `current` is not a valid version.
    pub fn new(current: &str) -> Result<Self, BusError> {
        let parsed =
            parse_version(current).ok_or_else(|| BusError::InvalidVersion(current.to_string()))?;
        Ok(Self {
            raw: current.to_string(),
            current: parsed,
        })
    }

    /// The current version string.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.raw
    }

    /// Whether a module built against `candidate` can use this bus.
    #[must_use]
    pub fn is_supported(&self, candidate: &str) -> bool {
        let Some(version) = parse_version(candidate) else {
            return false;
        };

        if candidate == self.raw {
            return true;
        }

        if version.major == 0 && self.current.major == 0 {
            return true;
        }

        version.major == self.current.major && version.minor <= self.current.minor
    }

    /// Delivery contract of this bus. Always synchronous.
    #[must_use]
    pub fn delivery_mode(&self) -> DeliveryMode {
        DeliveryMode::Synchronous
    }
}

impl Default for VersionGate {
    fn default() -> Self {
        Self::current()
    }
}

/// Numeric core of `input`, or `None` if it does not have the accepted shape.
fn parse_version(input: &str) -> Option<Version> {
    let (core, suffix) = match input.split_once('-') {
        Some((core, suffix)) => (core, Some(suffix)),
        None => (input, None),
    };

    if let Some(suffix) = suffix {
        let valid = !suffix.is_empty()
            && suffix
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.');
        if !valid {
            return None;
        }
    }

    let mut parts = core.split('.');
    let major = numeric(parts.next()?)?;
    let minor = numeric(parts.next()?)?;
    let patch = numeric(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }

    Some(Version::new(major, minor, patch))
}

fn numeric(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // All digits, so the only parse failure is overflow.
    Some(part.parse().unwrap_or(u64::MAX))
}
