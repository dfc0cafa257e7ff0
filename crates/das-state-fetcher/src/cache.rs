//! Bounded cache of fetched transactions.
//!
//! Historical lookups often hit the same previous transaction (several inputs
//! spending outputs of one transaction, or re-delivered blocks). Committed
//! transactions never change, so entries are never invalidated; the oldest
//! entry is evicted once the cache is full.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;

use das_types::{TransactionView, H256};

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<H256, Arc<TransactionView>>,
    order: VecDeque<H256>,
}

/// Thread-safe via internal RwLock. A capacity of zero disables caching.
#[derive(Debug)]
pub struct TransactionCache {
    capacity: usize,
    entries: RwLock<Entries>,
}

impl TransactionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn get(&self, hash: &H256) -> Option<Arc<TransactionView>> {
        self.entries.read().map.get(hash).cloned()
    }

    pub fn insert(&self, tx: Arc<TransactionView>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.write();
        if entries.map.contains_key(&tx.hash) {
            return;
        }
        while entries.map.len() >= self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.map.remove(&oldest);
                }
                None => break,
            }
        }
        entries.order.push_back(tx.hash);
        entries.map.insert(tx.hash, tx);
    }

    pub fn len(&self) -> usize {
        self.entries.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
