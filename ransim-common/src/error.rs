//! Error types for the ransim simulator
//!
//! One shared taxonomy is used across the workspace. The propagation policy
//! differs per variant: `NotFound` is always surfaced to the caller,
//! `Validation` rejects the offending sample, `ClassifierUnavailable` is
//! always recovered locally through the rule-based fallback, and
//! `InvariantViolation` marks a programming error.

use thiserror::Error;

/// Registry resource kinds used in lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// User equipment
    Ue,
    /// Antenna / cell
    Antenna,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Ue => write!(f, "UE"),
            ResourceKind::Antenna => write!(f, "antenna"),
        }
    }
}

/// Common error type for ransim operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Unknown UE or antenna id in a registry lookup
    #[error("{kind} {id} not found")]
    NotFound {
        /// Which registry missed
        kind: ResourceKind,
        /// The id that was looked up
        id: i32,
    },

    /// Malformed or out-of-range input (QoS sample, feature value, load factor)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Classifier collaborator failed, timed out, or returned garbage
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Programming error: an invariant the caller must uphold was broken
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (config or snapshot files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/serialize error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Shorthand for a UE lookup miss.
    pub fn ue_not_found(id: i32) -> Self {
        Error::NotFound {
            kind: ResourceKind::Ue,
            id,
        }
    }

    /// Shorthand for an antenna lookup miss.
    pub fn antenna_not_found(id: i32) -> Self {
        Error::NotFound {
            kind: ResourceKind::Antenna,
            id,
        }
    }

    /// True if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;
