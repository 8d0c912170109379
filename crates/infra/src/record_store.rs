//! Record storage boundary.

use std::sync::{Arc, RwLock};

use vault_core::AccountId;
use vault_ledger::{Record, RecordTable};

use crate::error::StoreError;

/// Holds the record table.
///
/// `transact` gives exclusive access, so the "absent?" check and the insert of
/// an initialization are one step relative to concurrent initializations.
pub trait RecordStore: Send + Sync {
    fn fetch(&self, owner: &AccountId) -> Result<Option<Record>, StoreError>;

    fn transact<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut RecordTable) -> Result<R, E>,
        E: From<StoreError>;
}

impl<S> RecordStore for Arc<S>
where
    S: RecordStore,
{
    fn fetch(&self, owner: &AccountId) -> Result<Option<Record>, StoreError> {
        (**self).fetch(owner)
    }

    fn transact<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut RecordTable) -> Result<R, E>,
        E: From<StoreError>,
    {
        (**self).transact(f)
    }
}

/// In-memory record store. Records live as long as the store.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    table: RwLock<RecordTable>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label_capacity(max_label_len: usize) -> Self {
        Self {
            table: RwLock::new(RecordTable::with_label_capacity(max_label_len)),
        }
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let table = self
            .table
            .read()
            .map_err(|_| StoreError::Poisoned("record table"))?;
        Ok(table.len())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn fetch(&self, owner: &AccountId) -> Result<Option<Record>, StoreError> {
        let table = self
            .table
            .read()
            .map_err(|_| StoreError::Poisoned("record table"))?;
        Ok(table.get(owner).cloned())
    }

    fn transact<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut RecordTable) -> Result<R, E>,
        E: From<StoreError>,
    {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::Poisoned("record table"))?;
        f(&mut table)
    }
}
