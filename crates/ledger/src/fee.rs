//! Execution-fee hook.
//!
//! Fees sit outside the transfer rule: the principal always moves exactly,
//! and whatever the model returns is charged to the payer afterwards (capped at
//! the payer's remaining balance). The recipient is never charged.

use crate::balances::TransferLamports;

/// Base fee per signature on a default cluster.
pub const DEFAULT_SIGNATURE_FEE: u64 = 5_000;

/// Pluggable cost model for transfers.
pub trait FeeModel: Send + Sync {
    /// Fee requested from the payer for an already-validated transfer.
    fn fee_for(&self, transfer: &TransferLamports) -> u64;
}

/// No execution cost.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoFee;

impl FeeModel for NoFee {
    fn fee_for(&self, _transfer: &TransferLamports) -> u64 {
        0
    }
}

/// Same fee for every transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatFee(pub u64);

impl Default for FlatFee {
    fn default() -> Self {
        Self(DEFAULT_SIGNATURE_FEE)
    }
}

impl FeeModel for FlatFee {
    fn fee_for(&self, _transfer: &TransferLamports) -> u64 {
        self.0
    }
}

impl<F> FeeModel for F
where
    F: Fn(&TransferLamports) -> u64 + Send + Sync,
{
    fn fee_for(&self, transfer: &TransferLamports) -> u64 {
        self(transfer)
    }
}
