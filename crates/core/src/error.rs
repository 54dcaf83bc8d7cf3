//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Storage concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A caller-supplied argument failed validation (e.g. a non-positive delta).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A stock reduction asked for more than is available.
    #[error("insufficient inventory: requested {requested}, available {available}")]
    InsufficientInventory { requested: i64, available: i64 },

    /// Money arithmetic across two different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A conflict occurred (uniqueness violation, stale version).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn insufficient_inventory(requested: i64, available: i64) -> Self {
        Self::InsufficientInventory {
            requested,
            available,
        }
    }

    pub fn currency_mismatch(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::CurrencyMismatch {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// True for caller argument failures (non-positive delta, negative quantity, ...).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_insufficient_inventory(&self) -> bool {
        matches!(self, Self::InsufficientInventory { .. })
    }
}
