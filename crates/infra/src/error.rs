//! Error types surfaced by the infrastructure layer.
//!
//! `StoreError` covers the stores themselves (never business failures).
//! `ExecutionError` is what services return: either the store failed, or the
//! domain rejected the command and nothing was changed.

use thiserror::Error;

use vault_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A previous holder of the lock panicked mid-operation.
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("ledger store failure: {0}")]
    Store(#[from] StoreError),
}

impl ExecutionError {
    /// The domain rejection, if this was one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ExecutionError::Domain(err) => Some(err),
            ExecutionError::Store(_) => None,
        }
    }
}
