//! Domain error model.

use thiserror::Error;

use crate::id::AccountId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a deterministic business failure returned to the immediate
/// caller. A command that fails with any of these has changed no state.
/// Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Zero-amount transfer or funding request.
    #[error("The transfer amount must be greater than 0")]
    InvalidAmount,

    /// The payer cannot cover the requested principal.
    #[error("Insufficient funds for the transfer (available: {available}, requested: {requested})")]
    InsufficientFunds { available: u64, requested: u64 },

    /// The owner already has a record; records are created exactly once.
    #[error("record already initialized for account {0}")]
    AlreadyInitialized(AccountId),

    /// The label does not fit in the record's allocated space.
    #[error("label is {len} bytes but the record holds at most {max}")]
    LabelTooLong { len: usize, max: usize },

    /// Crediting the account would overflow its balance.
    #[error("balance overflow on account {0}")]
    BalanceOverflow(AccountId),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn insufficient_funds(available: u64, requested: u64) -> Self {
        Self::InsufficientFunds {
            available,
            requested,
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// True for failures the caller can fix by retrying with different input
    /// or after funding, as opposed to ones that require a different account.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidAmount | DomainError::InsufficientFunds { .. }
        )
    }
}
