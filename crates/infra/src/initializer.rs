//! RecordInitializer: one-time creation of a labelled record per account.

use chrono::Utc;
use serde_json::Value as JsonValue;

use vault_core::{AccountId, Aggregate, AggregateRoot};
use vault_events::{EventBus, EventEnvelope};
use vault_ledger::{InitializeRecord, Record, RecordCommand};

use crate::error::ExecutionError;
use crate::publish::publish_committed;
use crate::record_store::RecordStore;

const RECORDS_AGGREGATE: &str = "ledger.records";

/// Creates records. Never touches balances.
///
/// Fails with `AlreadyInitialized` if `owner` has a record (the existing one
/// is left as is), or `LabelTooLong` if the label exceeds the store's capacity.
#[derive(Debug)]
pub struct RecordInitializer<S, B> {
    store: S,
    bus: B,
}

impl<S, B> RecordInitializer<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self { store, bus }
    }
}

impl<S, B> RecordInitializer<S, B>
where
    S: RecordStore,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn initialize(&self, owner: AccountId, label: impl Into<String>) -> Result<Record, ExecutionError> {
        let label = label.into();
        let cmd = RecordCommand::Initialize(InitializeRecord {
            owner,
            label: label.clone(),
            occurred_at: Utc::now(),
        });

        let (events, last_sequence) = self
            .store
            .transact(|table| -> Result<_, ExecutionError> {
                let events = table.execute(&cmd)?;
                Ok((events, table.version()))
            })
            .inspect_err(|err| tracing::warn!(%owner, error = %err, "initialize rejected"))?;

        tracing::info!(%owner, "Greetings from: {owner}");
        publish_committed(&self.bus, RECORDS_AGGREGATE, last_sequence, &events);

        Ok(Record::new(owner, label))
    }

    pub fn fetch(&self, owner: &AccountId) -> Result<Option<Record>, ExecutionError> {
        Ok(self.store.fetch(owner)?)
    }
}
