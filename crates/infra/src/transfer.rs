//! TransferExecutor: validated, atomic lamport transfers.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use vault_core::{AccountId, Aggregate, AggregateRoot, TransferId};
use vault_events::{EventBus, EventEnvelope};
use vault_ledger::{BalanceCommand, BalanceEvent, ChargeFee, FeeModel, NoFee, TransferLamports};

use crate::error::ExecutionError;
use crate::ledger_store::Ledger;
use crate::publish::publish_committed;

pub(crate) const BALANCES_AGGREGATE: &str = "ledger.balances";

/// Outcome of a successful transfer.
///
/// Balances are read inside the same critical section as the transfer, so they
/// are exactly the post-transfer (and post-fee) state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer_id: TransferId,
    pub payer: AccountId,
    pub recipient: AccountId,
    pub amount: u64,
    pub fee_charged: u64,
    pub payer_balance: u64,
    pub recipient_balance: u64,
}

/// Moves lamports between accounts.
///
/// Validation order (first failure wins):
///
/// 1. `amount > 0`, else `InvalidAmount`
/// 2. `balance(payer) >= amount`, else `InsufficientFunds`
/// 3. the recipient's balance must not overflow, else `BalanceOverflow`
///
/// On success the principal moves exactly, then the fee model's fee is taken
/// from the payer (capped at what the payer has left). Both happen under one
/// `Ledger::transact`. A rejected transfer changes nothing and publishes
/// nothing.
pub struct TransferExecutor<L, B> {
    ledger: L,
    bus: B,
    fee_model: Arc<dyn FeeModel>,
}

impl<L, B> TransferExecutor<L, B> {
    pub fn new(ledger: L, bus: B) -> Self {
        Self {
            ledger,
            bus,
            fee_model: Arc::new(NoFee),
        }
    }

    pub fn with_fee_model(mut self, fee_model: Arc<dyn FeeModel>) -> Self {
        self.fee_model = fee_model;
        self
    }
}

impl<L, B> core::fmt::Debug for TransferExecutor<L, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransferExecutor").finish_non_exhaustive()
    }
}

struct Committed {
    events: Vec<BalanceEvent>,
    last_sequence: u64,
    receipt: TransferReceipt,
}

impl<L, B> TransferExecutor<L, B>
where
    L: Ledger,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    pub fn transfer(
        &self,
        payer: AccountId,
        recipient: AccountId,
        amount: u64,
    ) -> Result<TransferReceipt, ExecutionError> {
        let cmd = TransferLamports::new(payer, recipient, amount);

        let committed = self
            .ledger
            .transact(|table| self.apply_transfer(table, &cmd))
            .inspect_err(|err| {
                tracing::warn!(%payer, %recipient, amount, error = %err, "transfer rejected");
            })?;

        tracing::info!(
            transfer_id = %committed.receipt.transfer_id,
            fee = committed.receipt.fee_charged,
            "Transferred {amount} lamports from {payer} to {recipient}"
        );

        publish_committed(
            &self.bus,
            BALANCES_AGGREGATE,
            committed.last_sequence,
            &committed.events,
        );

        Ok(committed.receipt)
    }

    /// Current balance of `account` (zero if never funded).
    pub fn balance(&self, account: &AccountId) -> Result<u64, ExecutionError> {
        Ok(self.ledger.balance(account)?)
    }

    fn apply_transfer(
        &self,
        table: &mut vault_ledger::BalanceTable,
        cmd: &TransferLamports,
    ) -> Result<Committed, ExecutionError> {
        let mut events = table.execute(&BalanceCommand::Transfer(cmd.clone()))?;

        let fee = self.fee_model.fee_for(cmd);
        let mut fee_charged = 0;
        if fee > 0 {
            let charged = table.execute(&BalanceCommand::ChargeFee(ChargeFee {
                account: cmd.payer,
                fee,
                occurred_at: Utc::now(),
            }))?;
            for event in &charged {
                if let BalanceEvent::FeeCharged(e) = event {
                    fee_charged += e.fee;
                }
            }
            events.extend(charged);
        }

        Ok(Committed {
            events,
            last_sequence: table.version(),
            receipt: TransferReceipt {
                transfer_id: cmd.transfer_id,
                payer: cmd.payer,
                recipient: cmd.recipient,
                amount: cmd.amount,
                fee_charged,
                payer_balance: table.balance(&cmd.payer),
                recipient_balance: table.balance(&cmd.recipient),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::DomainError;
    use vault_events::InMemoryEventBus;
    use vault_ledger::{FlatFee, LAMPORTS_PER_SOL};

    use crate::faucet::Faucet;
    use crate::ledger_store::InMemoryLedger;

    type Bus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;

    fn setup(fee: u64) -> (TransferExecutor<Arc<InMemoryLedger>, Bus>, Faucet<Arc<InMemoryLedger>, Bus>, Bus) {
        let ledger = Arc::new(InMemoryLedger::new());
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let executor = TransferExecutor::new(ledger.clone(), bus.clone())
            .with_fee_model(Arc::new(FlatFee(fee)));
        (executor, Faucet::new(ledger, bus.clone()), bus)
    }

    #[test]
    fn receipt_reflects_post_fee_balances() {
        let (executor, faucet, _) = setup(5_000);
        let (a, b) = (AccountId::new(), AccountId::new());
        faucet.request_airdrop(a, 10 * LAMPORTS_PER_SOL).unwrap();

        let receipt = executor.transfer(a, b, LAMPORTS_PER_SOL).unwrap();

        assert_eq!(receipt.fee_charged, 5_000);
        assert_eq!(receipt.recipient_balance, LAMPORTS_PER_SOL);
        assert_eq!(receipt.payer_balance, 9 * LAMPORTS_PER_SOL - 5_000);
        assert_eq!(executor.balance(&a).unwrap(), receipt.payer_balance);
    }

    #[test]
    fn fee_never_drives_payer_negative() {
        let (executor, faucet, _) = setup(5_000);
        let (a, b) = (AccountId::new(), AccountId::new());
        faucet.request_airdrop(a, 1_000).unwrap();

        let receipt = executor.transfer(a, b, 1_000).unwrap();

        assert_eq!(receipt.fee_charged, 0);
        assert_eq!(receipt.payer_balance, 0);
        assert_eq!(receipt.recipient_balance, 1_000);
    }

    #[test]
    fn rejected_transfer_charges_no_fee_and_publishes_nothing() {
        let (executor, faucet, bus) = setup(5_000);
        let (a, b) = (AccountId::new(), AccountId::new());
        faucet.request_airdrop(a, 100).unwrap();
        let sub = bus.subscribe();

        let err = executor.transfer(a, b, 0).unwrap_err();

        assert_eq!(err.as_domain(), Some(&DomainError::InvalidAmount));
        assert_eq!(executor.balance(&a).unwrap(), 100);
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn transfer_publishes_principal_then_fee() {
        let (executor, faucet, bus) = setup(5_000);
        let (a, b) = (AccountId::new(), AccountId::new());
        faucet.request_airdrop(a, LAMPORTS_PER_SOL).unwrap();
        let sub = bus.subscribe();

        executor.transfer(a, b, 10).unwrap();

        let published = sub.drain();
        let types: Vec<&str> = published.iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec!["ledger.balances.transferred", "ledger.balances.fee_charged"]
        );
        assert_eq!(published[0].sequence_number(), 2);
        assert_eq!(published[1].sequence_number(), 3);
        assert!(published.iter().all(|e| e.aggregate_type() == BALANCES_AGGREGATE));
    }
}
