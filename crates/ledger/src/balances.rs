use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vault_core::{AccountId, Aggregate, AggregateRoot, DomainError, TransferId};
use vault_events::Event;

/// Lamports in one SOL (smallest indivisible unit of value).
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Aggregate root: the account balance table.
///
/// Balances are `u64` lamports and can never go negative. Accounts that were
/// never funded read as zero.
///
/// Fees charged on top of a transfer are burned: they leave `total_supply()`
/// and accumulate in `fees_collected()`, so `total_supply + fees_collected`
/// only ever grows through funding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceTable {
    balances: HashMap<AccountId, u64>,
    fees_collected: u128,
    version: u64,
}

impl BalanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Sum of every balance in the table.
    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }

    pub fn fees_collected(&self) -> u128 {
        self.fees_collected
    }

    /// Number of accounts that have ever held a balance entry.
    pub fn accounts(&self) -> usize {
        self.balances.len()
    }

    fn credit(&mut self, account: AccountId, amount: u64) {
        let entry = self.balances.entry(account).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    fn debit(&mut self, account: AccountId, amount: u64) {
        let entry = self.balances.entry(account).or_insert(0);
        *entry = entry.saturating_sub(amount);
    }
}

impl AggregateRoot for BalanceTable {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: Fund (airdrop into an account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    pub account: AccountId,
    pub amount: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: TransferLamports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLamports {
    pub transfer_id: TransferId,
    pub payer: AccountId,
    pub recipient: AccountId,
    pub amount: u64,
    pub occurred_at: DateTime<Utc>,
}

impl TransferLamports {
    pub fn new(payer: AccountId, recipient: AccountId, amount: u64) -> Self {
        Self {
            transfer_id: TransferId::new(),
            payer,
            recipient,
            amount,
            occurred_at: Utc::now(),
        }
    }
}

/// Command: ChargeFee.
///
/// Charges at most the account's current balance; the fee is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeFee {
    pub account: AccountId,
    pub fee: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceCommand {
    Fund(Fund),
    Transfer(TransferLamports),
    ChargeFee(ChargeFee),
}

/// Event: Funded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funded {
    pub account: AccountId,
    pub amount: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Transferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transferred {
    pub transfer_id: TransferId,
    pub payer: AccountId,
    pub recipient: AccountId,
    pub amount: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: FeeCharged. `fee` is what was actually taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeCharged {
    pub account: AccountId,
    pub fee: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceEvent {
    Funded(Funded),
    Transferred(Transferred),
    FeeCharged(FeeCharged),
}

impl Event for BalanceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BalanceEvent::Funded(_) => "ledger.balances.funded",
            BalanceEvent::Transferred(_) => "ledger.balances.transferred",
            BalanceEvent::FeeCharged(_) => "ledger.balances.fee_charged",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BalanceEvent::Funded(e) => e.occurred_at,
            BalanceEvent::Transferred(e) => e.occurred_at,
            BalanceEvent::FeeCharged(e) => e.occurred_at,
        }
    }
}

impl Aggregate for BalanceTable {
    type Command = BalanceCommand;
    type Event = BalanceEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BalanceEvent::Funded(e) => self.credit(e.account, e.amount),
            BalanceEvent::Transferred(e) => {
                if e.payer != e.recipient {
                    self.debit(e.payer, e.amount);
                    self.credit(e.recipient, e.amount);
                }
            }
            BalanceEvent::FeeCharged(e) => {
                self.debit(e.account, e.fee);
                self.fees_collected += e.fee as u128;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BalanceCommand::Fund(cmd) => self.handle_fund(cmd),
            BalanceCommand::Transfer(cmd) => self.handle_transfer(cmd),
            BalanceCommand::ChargeFee(cmd) => Ok(self.handle_fee(cmd)),
        }
    }
}

impl BalanceTable {
    fn handle_fund(&self, cmd: &Fund) -> Result<Vec<BalanceEvent>, DomainError> {
        if cmd.amount == 0 {
            return Err(DomainError::InvalidAmount);
        }
        self.balance(&cmd.account)
            .checked_add(cmd.amount)
            .ok_or(DomainError::BalanceOverflow(cmd.account))?;

        Ok(vec![BalanceEvent::Funded(Funded {
            account: cmd.account,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    /// Checks run in a fixed order; the first failure is the one reported.
    fn handle_transfer(&self, cmd: &TransferLamports) -> Result<Vec<BalanceEvent>, DomainError> {
        if cmd.amount == 0 {
            return Err(DomainError::InvalidAmount);
        }

        let available = self.balance(&cmd.payer);
        if available < cmd.amount {
            return Err(DomainError::insufficient_funds(available, cmd.amount));
        }

        if cmd.payer != cmd.recipient {
            self.balance(&cmd.recipient)
                .checked_add(cmd.amount)
                .ok_or(DomainError::BalanceOverflow(cmd.recipient))?;
        }

        Ok(vec![BalanceEvent::Transferred(Transferred {
            transfer_id: cmd.transfer_id,
            payer: cmd.payer,
            recipient: cmd.recipient,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_fee(&self, cmd: &ChargeFee) -> Vec<BalanceEvent> {
        let fee = cmd.fee.min(self.balance(&cmd.account));
        if fee == 0 {
            return vec![];
        }
        vec![BalanceEvent::FeeCharged(FeeCharged {
            account: cmd.account,
            fee,
            occurred_at: cmd.occurred_at,
        })]
    }
}
