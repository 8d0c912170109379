//! In-memory service wiring.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use vault_events::{EventEnvelope, InMemoryEventBus};

use crate::config::VaultConfig;
use crate::faucet::Faucet;
use crate::initializer::RecordInitializer;
use crate::ledger_store::InMemoryLedger;
use crate::record_store::InMemoryRecordStore;
use crate::transfer::TransferExecutor;

pub type LedgerBus = InMemoryEventBus<EventEnvelope<JsonValue>>;

/// Everything needed to serve the ledger in one process.
///
/// The stores are shared: the faucet and the transfer executor mutate the same
/// balance table.
#[derive(Debug)]
pub struct VaultServices {
    pub ledger: Arc<InMemoryLedger>,
    pub records: Arc<InMemoryRecordStore>,
    pub bus: Arc<LedgerBus>,
    pub faucet: Faucet<Arc<InMemoryLedger>, Arc<LedgerBus>>,
    pub transfers: TransferExecutor<Arc<InMemoryLedger>, Arc<LedgerBus>>,
    pub initializer: RecordInitializer<Arc<InMemoryRecordStore>, Arc<LedgerBus>>,
}

pub fn build_in_memory(config: &VaultConfig) -> VaultServices {
    let ledger = Arc::new(InMemoryLedger::new());
    let records = Arc::new(InMemoryRecordStore::with_label_capacity(config.max_label_len));
    let bus: Arc<LedgerBus> = Arc::new(InMemoryEventBus::new());

    tracing::debug!(
        fee_lamports = config.fee_lamports,
        max_label_len = config.max_label_len,
        "building in-memory vault services"
    );

    VaultServices {
        faucet: Faucet::new(ledger.clone(), bus.clone()),
        transfers: TransferExecutor::new(ledger.clone(), bus.clone())
            .with_fee_model(config.fee_model()),
        initializer: RecordInitializer::new(records.clone(), bus.clone()),
        ledger,
        records,
        bus,
    }
}
