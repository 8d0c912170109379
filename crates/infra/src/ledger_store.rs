//! Authoritative balance storage boundary.

use std::sync::{Arc, RwLock};

use vault_core::AccountId;
use vault_ledger::BalanceTable;

use crate::error::StoreError;

/// Holds the balance table and serializes every state transition on it.
///
/// ## Atomicity
///
/// `transact` hands the closure exclusive access to the table. Whatever the
/// closure reads and writes is one critical section: no other `transact` or
/// read can observe the table between the balance check and the mutation, so a
/// transfer is seen either fully applied or not at all.
///
/// Implementations must not hold the critical section across anything that can
/// block indefinitely (publishing happens after `transact` returns).
pub trait Ledger: Send + Sync {
    fn balance(&self, account: &AccountId) -> Result<u64, StoreError>;

    fn total_supply(&self) -> Result<u128, StoreError>;

    fn fees_collected(&self) -> Result<u128, StoreError>;

    /// Run `f` with exclusive access to the balance table.
    fn transact<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut BalanceTable) -> Result<R, E>,
        E: From<StoreError>;
}

impl<L> Ledger for Arc<L>
where
    L: Ledger,
{
    fn balance(&self, account: &AccountId) -> Result<u64, StoreError> {
        (**self).balance(account)
    }

    fn total_supply(&self) -> Result<u128, StoreError> {
        (**self).total_supply()
    }

    fn fees_collected(&self) -> Result<u128, StoreError> {
        (**self).fees_collected()
    }

    fn transact<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut BalanceTable) -> Result<R, E>,
        E: From<StoreError>,
    {
        (**self).transact(f)
    }
}

/// In-memory ledger behind a single `RwLock`.
///
/// Reads share the lock; every transition takes it exclusively.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    table: RwLock<BalanceTable>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, f: impl FnOnce(&BalanceTable) -> R) -> Result<R, StoreError> {
        let table = self
            .table
            .read()
            .map_err(|_| StoreError::Poisoned("balance table"))?;
        Ok(f(&table))
    }
}

impl Ledger for InMemoryLedger {
    fn balance(&self, account: &AccountId) -> Result<u64, StoreError> {
        self.read(|t| t.balance(account))
    }

    fn total_supply(&self) -> Result<u128, StoreError> {
        self.read(BalanceTable::total_supply)
    }

    fn fees_collected(&self) -> Result<u128, StoreError> {
        self.read(BalanceTable::fees_collected)
    }

    fn transact<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut BalanceTable) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::Poisoned("balance table"))?;
        f(&mut table)
    }
}
