//! Vault ledger module (balance transfers + one-time records).
//!
//! Pure domain logic only: no IO, no locking, no persistence concerns.

pub mod balances;
pub mod fee;
pub mod records;

pub use balances::{
    BalanceCommand, BalanceEvent, BalanceTable, ChargeFee, FeeCharged, Fund, Funded,
    LAMPORTS_PER_SOL, TransferLamports, Transferred,
};
pub use fee::{DEFAULT_SIGNATURE_FEE, FeeModel, FlatFee, NoFee};
pub use records::{
    InitializeRecord, MAX_LABEL_LEN, RECORD_SPACE, Record, RecordCommand, RecordEvent,
    RecordInitialized, RecordTable,
};
