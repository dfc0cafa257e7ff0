//! Shared types for the das-indexer workspace.
//!
//! This crate provides foundational types used across the workspace crates:
//!
//! - [`chain`]: the UTXO-style chain model (cells, scripts, transactions, headers)
//! - [`account`]: account id derivation and account status
//! - [`constants`]: action and contract names recognized by the indexer
//! - [`encoding`]: hex helpers and outpoint string formatting
//! - [`env_utils`]: environment variable parsing

pub mod account;
pub mod chain;
pub mod constants;
pub mod encoding;
pub mod env_utils;
pub mod serde_hex;

pub use account::{account_id_from_name, AccountId, AccountStatus, ACCOUNT_SUFFIX};
pub use chain::{
    CellDep, CellInput, CellOutput, Header, OutPoint, Script, ScriptHashType, Transaction,
    TransactionView, H256,
};
pub use constants::{DasAction, DasContractName};
pub use encoding::{bytes_to_hex, hex_to_bytes, outpoint_to_string, parse_outpoint_string};
pub use env_utils::{env_bool, env_string_or, env_var, env_var_or};

use std::time::Duration;

/// Configuration for retry behavior on network operations.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetryConfig {
    /// Number of retry attempts after the first failure.
    pub retries: usize,
    /// Initial backoff between retries, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Maximum backoff between retries, in milliseconds.
    pub max_backoff_ms: u64,
}

impl RetryConfig {
    pub fn new(retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// Backoff before retry number `attempt` (0-based), doubling up to the maximum.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let factor = 1u64.checked_shl(attempt.min(32) as u32).unwrap_or(u64::MAX);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 5000,
        }
    }
}
