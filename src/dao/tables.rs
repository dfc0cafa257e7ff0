//! Rows of the four logical tables.

use serde::{Deserialize, Serialize};

use das_types::AccountStatus;

/// Income cell awaiting consolidation.
pub const INCOME_CELL_STATUS_UNMERGED: u8 = 0;
pub const INCOME_CELL_STATUS_MERGED: u8 = 1;

/// Current snapshot of one account, keyed by `account_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAccountInfo {
    pub block_number: u64,
    pub outpoint: String,
    pub account_id: String,
    pub account: String,
    pub owner_chain_type: u8,
    pub owner: String,
    pub owner_algorithm_id: u8,
    pub manager_chain_type: u8,
    pub manager: String,
    pub manager_algorithm_id: u8,
    pub expired_at: u64,
    pub status: AccountStatus,
    pub enable_sub_account: u8,
    /// Set by sub-account registration, which this crate does not handle;
    /// empty for top level accounts. Recycling a parent removes its children.
    pub parent_account_id: String,
}

/// Ledger row, keyed by `outpoint`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableTransactionInfo {
    pub block_number: u64,
    pub account_id: String,
    pub account: String,
    pub action: String,
    pub service_type: u8,
    pub chain_type: u8,
    pub address: String,
    pub capacity: u64,
    pub outpoint: String,
    pub block_timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecordsInfo {
    pub account_id: String,
    pub account: String,
    pub key: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub label: String,
    pub value: String,
    /// Decimal string.
    pub ttl: String,
}

/// Keyed by `outpoint`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableIncomeCellInfo {
    pub block_number: u64,
    pub action: String,
    pub outpoint: String,
    pub capacity: u64,
    pub block_timestamp: u64,
    pub status: u8,
}
