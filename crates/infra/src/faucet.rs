//! Faucet: funds accounts (airdrop) so they can pay for transfers.

use chrono::Utc;
use serde_json::Value as JsonValue;

use vault_core::{AccountId, Aggregate, AggregateRoot};
use vault_events::{EventBus, EventEnvelope};
use vault_ledger::{BalanceCommand, Fund};

use crate::error::ExecutionError;
use crate::ledger_store::Ledger;
use crate::publish::publish_committed;
use crate::transfer::BALANCES_AGGREGATE;

#[derive(Debug)]
pub struct Faucet<L, B> {
    ledger: L,
    bus: B,
}

impl<L, B> Faucet<L, B> {
    pub fn new(ledger: L, bus: B) -> Self {
        Self { ledger, bus }
    }
}

impl<L, B> Faucet<L, B>
where
    L: Ledger,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    /// Credit `amount` lamports to `account`, returning the new balance.
    pub fn request_airdrop(&self, account: AccountId, amount: u64) -> Result<u64, ExecutionError> {
        let cmd = BalanceCommand::Fund(Fund {
            account,
            amount,
            occurred_at: Utc::now(),
        });

        let (events, last_sequence, balance) = self
            .ledger
            .transact(|table| -> Result<_, ExecutionError> {
                let events = table.execute(&cmd)?;
                Ok((events, table.version(), table.balance(&account)))
            })
            .inspect_err(|err| tracing::warn!(%account, amount, error = %err, "airdrop rejected"))?;

        tracing::debug!(%account, amount, balance, "airdrop credited");
        publish_committed(&self.bus, BALANCES_AGGREGATE, last_sequence, &events);

        Ok(balance)
    }
}
