//! Errors raised by the toner and equipment aggregates.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Why a command was refused.
///
/// Every variant is deterministic: retrying the same command against the
/// same state fails the same way.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed command input (empty name, too-short serial number, ...).
    #[error("invalid input: {0}")]
    Validation(String),

    /// Well-formed input that the current state cannot accept (stock below
    /// zero, a meter counter running backwards).
    #[error("rule violated: {0}")]
    InvariantViolation(String),

    #[error("malformed id: {0}")]
    InvalidId(String),

    /// The toner or device does not exist, or was removed.
    #[error("not found")]
    NotFound,

    /// Stale expected version or duplicate registration.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
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

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
