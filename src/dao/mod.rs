//! Persistence boundary.
//!
//! One method per action. Every method is a single atomic multi-table write,
//! and a write whose transaction row already exists (same outpoint) must leave
//! the store unchanged, so a re-delivered transaction is harmless.

mod memory;
mod tables;

pub use memory::MemoryDao;
pub use tables::{
    TableAccountInfo, TableIncomeCellInfo, TableRecordsInfo, TableTransactionInfo,
    INCOME_CELL_STATUS_MERGED, INCOME_CELL_STATUS_UNMERGED,
};

use anyhow::Result;
use das_types::AccountStatus;

#[async_trait::async_trait]
pub trait DbDao: Send + Sync {
    /// Replace the record set of an account and move it to the new outpoint.
    async fn create_records_infos(
        &self,
        account: &TableAccountInfo,
        records: &[TableRecordsInfo],
        tx: &TableTransactionInfo,
    ) -> Result<()>;

    /// Update the manager identity of an account.
    async fn edit_manager(&self, account: &TableAccountInfo, tx: &TableTransactionInfo)
        -> Result<()>;

    /// Extend expiration, consume `spent_outpoints` income cells and add the new ones.
    async fn renew_account(
        &self,
        spent_outpoints: &[String],
        income_cells: &[TableIncomeCellInfo],
        account: &TableAccountInfo,
        tx: &TableTransactionInfo,
    ) -> Result<()>;

    /// Move an account to a new owner and manager, replacing its records.
    async fn transfer_account(
        &self,
        account: &TableAccountInfo,
        tx: &TableTransactionInfo,
        records: &[TableRecordsInfo],
    ) -> Result<()>;

    async fn force_recover_account_status(
        &self,
        old_status: AccountStatus,
        account: &TableAccountInfo,
        tx: &TableTransactionInfo,
    ) -> Result<()>;

    /// Delete an account, its records and, if enabled, its sub-accounts.
    async fn recycle_expired_account(
        &self,
        account_id: &str,
        enable_sub_account: u8,
        tx: &TableTransactionInfo,
    ) -> Result<()>;

    /// Lock or unlock an account for cross-chain use.
    async fn account_cross_chain(
        &self,
        account: &TableAccountInfo,
        tx: &TableTransactionInfo,
    ) -> Result<()>;
}
