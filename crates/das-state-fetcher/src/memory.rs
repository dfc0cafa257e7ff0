//! In-memory chain for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use parking_lot::RwLock;

use das_types::{Header, TransactionView, H256};

use crate::client::{ChainClient, FetchedTransaction};

#[derive(Debug, Default)]
pub struct MemoryChain {
    transactions: RwLock<HashMap<H256, FetchedTransaction>>,
    headers: RwLock<HashMap<H256, Header>>,
    offline: AtomicBool,
    transaction_fetches: AtomicUsize,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a committed transaction and its block header.
    pub fn insert_committed(&self, view: TransactionView, header: Header) {
        let fetched = FetchedTransaction {
            view,
            block_hash: Some(header.hash),
        };
        self.transactions.write().insert(fetched.view.hash, fetched);
        self.headers.write().insert(header.hash, header);
    }

    /// Add a transaction without block information.
    pub fn insert_transaction(&self, view: TransactionView) {
        self.transactions.write().insert(
            view.hash,
            FetchedTransaction {
                view,
                block_hash: None,
            },
        );
    }

    /// While offline every query fails, as a dropped connection would.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `get_transaction` calls served so far.
    pub fn transaction_fetches(&self) -> usize {
        self.transaction_fetches.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(anyhow!("chain unreachable"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ChainClient for MemoryChain {
    async fn get_transaction(&self, hash: &H256) -> Result<Option<FetchedTransaction>> {
        self.check_online()?;
        self.transaction_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.transactions.read().get(hash).cloned())
    }

    async fn get_header(&self, block_hash: &H256) -> Result<Option<Header>> {
        self.check_online()?;
        Ok(self.headers.read().get(block_hash).cloned())
    }
}
