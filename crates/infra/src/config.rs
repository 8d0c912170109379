//! Configuration loading and representation.

use std::str::FromStr;
use std::sync::Arc;

use vault_ledger::{FeeModel, FlatFee, MAX_LABEL_LEN, NoFee};

pub const FEE_LAMPORTS_VAR: &str = "VAULT_FEE_LAMPORTS";
pub const MAX_LABEL_LEN_VAR: &str = "VAULT_MAX_LABEL_LEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// Flat fee charged to the payer after each transfer (0 disables fees).
    pub fee_lamports: u64,
    /// Record label capacity in bytes.
    pub max_label_len: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            fee_lamports: 0,
            max_label_len: MAX_LABEL_LEN,
        }
    }
}

impl VaultConfig {
    /// Load from process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup. Unparsable values log a warning
    /// and keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            fee_lamports: parse_or(&lookup, FEE_LAMPORTS_VAR, defaults.fee_lamports),
            max_label_len: parse_or(&lookup, MAX_LABEL_LEN_VAR, defaults.max_label_len),
        }
    }

    pub fn fee_model(&self) -> Arc<dyn FeeModel> {
        match self.fee_lamports {
            0 => Arc::new(NoFee),
            fee => Arc::new(FlatFee(fee)),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + core::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{key}={raw:?} is not valid; using default {default}");
            default
        }),
    }
}
