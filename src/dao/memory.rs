//! In-memory implementation of the persistence boundary.
//!
//! All tables live behind one lock, so every action's write set is applied
//! whole or not at all. Used by the CLI and the test suite.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use das_types::AccountStatus;

use super::tables::{TableAccountInfo, TableIncomeCellInfo, TableRecordsInfo, TableTransactionInfo};
use super::DbDao;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MemorySnapshot {
    pub accounts: BTreeMap<String, TableAccountInfo>,
    pub transactions: BTreeMap<String, TableTransactionInfo>,
    pub records: BTreeMap<String, Vec<TableRecordsInfo>>,
    pub income_cells: BTreeMap<String, TableIncomeCellInfo>,
}

impl MemorySnapshot {
    /// Existing account row, or a fresh one carrying only the identity.
    fn account_row(&mut self, account: &TableAccountInfo) -> &mut TableAccountInfo {
        let row = self
            .accounts
            .entry(account.account_id.clone())
            .or_insert_with(|| TableAccountInfo {
                account_id: account.account_id.clone(),
                ..Default::default()
            });
        row.block_number = account.block_number;
        row.outpoint = account.outpoint.clone();
        if !account.account.is_empty() {
            row.account = account.account.clone();
        }
        row
    }

    fn replace_records(&mut self, account_id: &str, records: &[TableRecordsInfo]) {
        if records.is_empty() {
            self.records.remove(account_id);
        } else {
            self.records.insert(account_id.to_string(), records.to_vec());
        }
    }
}

fn set_owner_and_manager(row: &mut TableAccountInfo, account: &TableAccountInfo) {
    row.owner_chain_type = account.owner_chain_type;
    row.owner = account.owner.clone();
    row.owner_algorithm_id = account.owner_algorithm_id;
    set_manager(row, account);
}

fn set_manager(row: &mut TableAccountInfo, account: &TableAccountInfo) {
    row.manager_chain_type = account.manager_chain_type;
    row.manager = account.manager.clone();
    row.manager_algorithm_id = account.manager_algorithm_id;
}

#[derive(Debug, Default)]
pub struct MemoryDao {
    tables: RwLock<MemorySnapshot>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryDao {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one write set keyed by its transaction row.
    fn apply(&self, tx: &TableTransactionInfo, write: impl FnOnce(&mut MemorySnapshot)) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("storage unavailable"));
        }
        let mut tables = self.tables.write();
        if tables.transactions.contains_key(&tx.outpoint) {
            debug!(outpoint = %tx.outpoint, action = %tx.action, "transaction already persisted");
            return Ok(());
        }
        write(&mut *tables);
        tables.transactions.insert(tx.outpoint.clone(), tx.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Number of write sets applied (re-deliveries not counted).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every following write fail, as an unreachable database would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn insert_account(&self, account: TableAccountInfo) {
        self.tables
            .write()
            .accounts
            .insert(account.account_id.clone(), account);
    }

    pub fn insert_records(&self, account_id: &str, records: Vec<TableRecordsInfo>) {
        self.tables.write().records.insert(account_id.to_string(), records);
    }

    pub fn insert_income_cell(&self, cell: TableIncomeCellInfo) {
        self.tables
            .write()
            .income_cells
            .insert(cell.outpoint.clone(), cell);
    }

    pub fn account(&self, account_id: &str) -> Option<TableAccountInfo> {
        self.tables.read().accounts.get(account_id).cloned()
    }

    pub fn transaction(&self, outpoint: &str) -> Option<TableTransactionInfo> {
        self.tables.read().transactions.get(outpoint).cloned()
    }

    pub fn transaction_count(&self) -> usize {
        self.tables.read().transactions.len()
    }

    pub fn records(&self, account_id: &str) -> Vec<TableRecordsInfo> {
        self.tables
            .read()
            .records
            .get(account_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn income_cells(&self) -> Vec<TableIncomeCellInfo> {
        self.tables.read().income_cells.values().cloned().collect()
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        self.tables.read().clone()
    }
}

#[async_trait::async_trait]
impl DbDao for MemoryDao {
    async fn create_records_infos(
        &self,
        account: &TableAccountInfo,
        records: &[TableRecordsInfo],
        tx: &TableTransactionInfo,
    ) -> Result<()> {
        self.apply(tx, |tables| {
            tables.account_row(account);
            tables.replace_records(&account.account_id, records);
        })
    }

    async fn edit_manager(&self, account: &TableAccountInfo, tx: &TableTransactionInfo) -> Result<()> {
        self.apply(tx, |tables| {
            let row = tables.account_row(account);
            set_manager(row, account);
        })
    }

    async fn renew_account(
        &self,
        spent_outpoints: &[String],
        income_cells: &[TableIncomeCellInfo],
        account: &TableAccountInfo,
        tx: &TableTransactionInfo,
    ) -> Result<()> {
        self.apply(tx, |tables| {
            for outpoint in spent_outpoints {
                tables.income_cells.remove(outpoint);
            }
            for cell in income_cells {
                tables.income_cells.insert(cell.outpoint.clone(), cell.clone());
            }
            tables.account_row(account).expired_at = account.expired_at;
        })
    }

    async fn transfer_account(
        &self,
        account: &TableAccountInfo,
        tx: &TableTransactionInfo,
        records: &[TableRecordsInfo],
    ) -> Result<()> {
        self.apply(tx, |tables| {
            let row = tables.account_row(account);
            set_owner_and_manager(row, account);
            tables.replace_records(&account.account_id, records);
        })
    }

    async fn force_recover_account_status(
        &self,
        old_status: AccountStatus,
        account: &TableAccountInfo,
        tx: &TableTransactionInfo,
    ) -> Result<()> {
        self.apply(tx, |tables| {
            debug!(
                account_id = %account.account_id,
                old_status = %old_status,
                new_status = %account.status,
                "recovering account status"
            );
            tables.account_row(account).status = account.status;
        })
    }

    async fn recycle_expired_account(
        &self,
        account_id: &str,
        enable_sub_account: u8,
        tx: &TableTransactionInfo,
    ) -> Result<()> {
        self.apply(tx, |tables| {
            tables.accounts.remove(account_id);
            tables.records.remove(account_id);
            if enable_sub_account == 1 {
                let children: Vec<String> = tables
                    .accounts
                    .values()
                    .filter(|a| a.parent_account_id == account_id)
                    .map(|a| a.account_id.clone())
                    .collect();
                for child in children {
                    tables.accounts.remove(&child);
                    tables.records.remove(&child);
                }
            }
        })
    }

    async fn account_cross_chain(
        &self,
        account: &TableAccountInfo,
        tx: &TableTransactionInfo,
    ) -> Result<()> {
        self.apply(tx, |tables| {
            let row = tables.account_row(account);
            set_owner_and_manager(row, account);
            row.status = account.status;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx_row(outpoint: &str) -> TableTransactionInfo {
        TableTransactionInfo {
            outpoint: outpoint.to_string(),
            action: "edit_manager".to_string(),
            ..Default::default()
        }
    }

    fn account_row(id: &str) -> TableAccountInfo {
        TableAccountInfo {
            account_id: id.to_string(),
            account: format!("{}.bit", id),
            owner: "0xowner".to_string(),
            manager: "0xmanager".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_duplicate_outpoint_is_noop() {
        let dao = MemoryDao::new();
        let mut account = account_row("a");
        dao.edit_manager(&account, &tx_row("0x01-0")).await.unwrap();
        assert_eq!(dao.write_count(), 1);

        account.manager = "0xother".to_string();
        dao.edit_manager(&account, &tx_row("0x01-0")).await.unwrap();
        assert_eq!(dao.write_count(), 1);
        assert_eq!(dao.transaction_count(), 1);
        assert_eq!(dao.account("a").unwrap().manager, "0xmanager");
    }

    #[tokio::test]
    async fn test_edit_manager_keeps_owner() {
        let dao = MemoryDao::new();
        dao.insert_account(account_row("a"));
        let update = TableAccountInfo {
            account_id: "a".to_string(),
            manager: "0xnew".to_string(),
            manager_chain_type: 1,
            ..Default::default()
        };
        dao.edit_manager(&update, &tx_row("0x02-0")).await.unwrap();
        let row = dao.account("a").unwrap();
        assert_eq!(row.owner, "0xowner");
        assert_eq!(row.manager, "0xnew");
        assert_eq!(row.account, "a.bit");
    }

    #[tokio::test]
    async fn test_renew_consumes_spent_income_cells() {
        let dao = MemoryDao::new();
        dao.insert_income_cell(TableIncomeCellInfo {
            outpoint: "0x00-1".to_string(),
            capacity: 10,
            ..Default::default()
        });
        let new_cell = TableIncomeCellInfo {
            outpoint: "0x03-1".to_string(),
            capacity: 20,
            ..Default::default()
        };
        dao.renew_account(
            &["0x00-1".to_string()],
            &[new_cell.clone()],
            &TableAccountInfo {
                account_id: "a".to_string(),
                expired_at: 99,
                ..Default::default()
            },
            &tx_row("0x03-0"),
        )
        .await
        .unwrap();
        assert_eq!(dao.income_cells(), vec![new_cell]);
        assert_eq!(dao.account("a").unwrap().expired_at, 99);
    }

    #[tokio::test]
    async fn test_recycle_removes_sub_accounts() {
        let dao = MemoryDao::new();
        dao.insert_account(account_row("parent"));
        dao.insert_account(TableAccountInfo {
            parent_account_id: "parent".to_string(),
            ..account_row("child")
        });
        dao.insert_account(account_row("other"));
        dao.insert_records("parent", vec![TableRecordsInfo::default()]);

        dao.recycle_expired_account("parent", 1, &tx_row("0x04-0"))
            .await
            .unwrap();
        assert!(dao.account("parent").is_none());
        assert!(dao.account("child").is_none());
        assert!(dao.account("other").is_some());
        assert!(dao.records("parent").is_empty());
    }

    #[tokio::test]
    async fn test_recycle_keeps_sub_accounts_when_disabled() {
        let dao = MemoryDao::new();
        dao.insert_account(account_row("parent"));
        dao.insert_account(TableAccountInfo {
            parent_account_id: "parent".to_string(),
            ..account_row("child")
        });
        dao.recycle_expired_account("parent", 0, &tx_row("0x05-0"))
            .await
            .unwrap();
        assert!(dao.account("child").is_some());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_trace() {
        let dao = MemoryDao::new();
        dao.set_fail_writes(true);
        assert!(dao
            .create_records_infos(&account_row("a"), &[TableRecordsInfo::default()], &tx_row("0x06-0"))
            .await
            .is_err());
        assert_eq!(dao.write_count(), 0);
        assert!(dao.account("a").is_none());
        assert!(dao.transaction("0x06-0").is_none());
    }
}
