//! Infrastructure layer: authoritative stores, services, config.

pub mod config;
pub mod error;
pub mod faucet;
pub mod initializer;
pub mod ledger_store;
pub mod record_store;
pub mod services;
pub mod transfer;

mod publish;

#[cfg(test)]
mod integration_tests;

pub use config::VaultConfig;
pub use error::{ExecutionError, StoreError};
pub use faucet::Faucet;
pub use initializer::RecordInitializer;
pub use ledger_store::{InMemoryLedger, Ledger};
pub use record_store::{InMemoryRecordStore, RecordStore};
pub use services::{LedgerBus, VaultServices, build_in_memory};
pub use transfer::{TransferExecutor, TransferReceipt};
