use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vault_core::{AccountId, Aggregate, AggregateRoot, DomainError, ValueObject};
use vault_events::Event;

const DISCRIMINATOR_LEN: usize = 8;
const DATA_LEN: usize = 200;
const STRING_LEN_PREFIX: usize = 4;

/// Bytes allocated per record: discriminator + string capacity.
pub const RECORD_SPACE: usize = DISCRIMINATOR_LEN + DATA_LEN;

/// Largest label (in bytes) that fits after the string length prefix.
pub const MAX_LABEL_LEN: usize = DATA_LEN - STRING_LEN_PREFIX;

/// A named record tied to one account. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    owner: AccountId,
    label: String,
}

impl Record {
    pub fn new(owner: AccountId, label: impl Into<String>) -> Self {
        Self {
            owner,
            label: label.into(),
        }
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl ValueObject for Record {}

/// Aggregate root: the record table (one record per owner, insert-only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTable {
    records: HashMap<AccountId, Record>,
    max_label_len: usize,
    version: u64,
}

impl Default for RecordTable {
    fn default() -> Self {
        Self::with_label_capacity(MAX_LABEL_LEN)
    }
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label_capacity(max_label_len: usize) -> Self {
        Self {
            records: HashMap::new(),
            max_label_len,
            version: 0,
        }
    }

    pub fn get(&self, owner: &AccountId) -> Option<&Record> {
        self.records.get(owner)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_label_len(&self) -> usize {
        self.max_label_len
    }
}

impl AggregateRoot for RecordTable {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: InitializeRecord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeRecord {
    pub owner: AccountId,
    pub label: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordCommand {
    Initialize(InitializeRecord),
}

/// Event: RecordInitialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInitialized {
    pub owner: AccountId,
    pub label: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordEvent {
    RecordInitialized(RecordInitialized),
}

impl Event for RecordEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RecordEvent::RecordInitialized(_) => "ledger.records.initialized",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RecordEvent::RecordInitialized(e) => e.occurred_at,
        }
    }
}

impl Aggregate for RecordTable {
    type Command = RecordCommand;
    type Event = RecordEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            RecordEvent::RecordInitialized(e) => {
                // Insert-only: an existing record is never replaced.
                self.records
                    .entry(e.owner)
                    .or_insert_with(|| Record::new(e.owner, e.label.clone()));
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            RecordCommand::Initialize(cmd) => self.handle_initialize(cmd),
        }
    }
}

impl RecordTable {
    fn handle_initialize(&self, cmd: &InitializeRecord) -> Result<Vec<RecordEvent>, DomainError> {
        if self.records.contains_key(&cmd.owner) {
            return Err(DomainError::AlreadyInitialized(cmd.owner));
        }
        if cmd.label.len() > self.max_label_len {
            return Err(DomainError::LabelTooLong {
                len: cmd.label.len(),
                max: self.max_label_len,
            });
        }

        Ok(vec![RecordEvent::RecordInitialized(RecordInitialized {
            owner: cmd.owner,
            label: cmd.label.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
