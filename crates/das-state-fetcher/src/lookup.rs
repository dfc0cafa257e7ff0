//! Historical state lookup.
//!
//! A transaction's inputs are bare outpoints. To learn who owned a consumed
//! cell, the transaction that created it has to be fetched and the referenced
//! output read.

use std::fmt;
use std::sync::Arc;

use das_types::{CellOutput, Transaction, TransactionView, H256};
use tracing::debug;

use crate::cache::TransactionCache;
use crate::client::ChainClient;

#[derive(Debug)]
pub enum LookupError {
    /// The input index does not exist in the current transaction.
    InputIndexOutOfRange { index: usize, inputs: usize },
    /// The outpoint references an output the previous transaction does not have.
    OutputIndexOutOfRange {
        tx_hash: H256,
        index: u32,
        outputs: usize,
    },
    /// The node does not (yet) know the previous transaction.
    TransactionNotFound(H256),
    /// Query failed in transit.
    Transient(anyhow::Error),
}

impl LookupError {
    /// Structural failures will not change on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LookupError::TransactionNotFound(_) | LookupError::Transient(_)
        )
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::InputIndexOutOfRange { index, inputs } => write!(
                f,
                "input index {} out of range ({} inputs)",
                index, inputs
            ),
            LookupError::OutputIndexOutOfRange {
                tx_hash,
                index,
                outputs,
            } => write!(
                f,
                "output index {} out of range in {} ({} outputs)",
                index, tx_hash, outputs
            ),
            LookupError::TransactionNotFound(hash) => write!(f, "transaction {} not found", hash),
            LookupError::Transient(e) => write!(f, "chain query failed: {}", e),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupError::Transient(e) => Some(&**e),
            _ => None,
        }
    }
}

/// Resolves inputs to the outputs they consume.
pub struct HistoricalStateProvider {
    client: Arc<dyn ChainClient>,
    cache: TransactionCache,
}

impl HistoricalStateProvider {
    pub fn new(client: Arc<dyn ChainClient>, cache_capacity: usize) -> Self {
        Self {
            client,
            cache: TransactionCache::new(cache_capacity),
        }
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    pub fn cache(&self) -> &TransactionCache {
        &self.cache
    }

    /// Fetch a transaction, serving repeated lookups from the cache.
    pub async fn get_transaction(&self, hash: &H256) -> Result<Arc<TransactionView>, LookupError> {
        if let Some(tx) = self.cache.get(hash) {
            debug!(tx_hash = %hash, "transaction cache hit");
            return Ok(tx);
        }
        let fetched = self
            .client
            .get_transaction(hash)
            .await
            .map_err(LookupError::Transient)?
            .ok_or(LookupError::TransactionNotFound(*hash))?;
        let view = Arc::new(fetched.view);
        if fetched.block_hash.is_some() {
            self.cache.insert(view.clone());
        }
        Ok(view)
    }

    /// The output consumed by `tx.inputs[input_index]`.
    pub async fn previous_output(
        &self,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<CellOutput, LookupError> {
        let input = tx
            .inputs
            .get(input_index)
            .ok_or(LookupError::InputIndexOutOfRange {
                index: input_index,
                inputs: tx.inputs.len(),
            })?;
        let previous = input.previous_output;
        let prev_tx = self.get_transaction(&previous.tx_hash).await?;
        prev_tx
            .inner
            .outputs
            .get(previous.index as usize)
            .cloned()
            .ok_or(LookupError::OutputIndexOutOfRange {
                tx_hash: previous.tx_hash,
                index: previous.index,
                outputs: prev_tx.inner.outputs.len(),
            })
    }

    /// Lock args of the output consumed by `tx.inputs[input_index]`.
    pub async fn previous_lock_args(
        &self,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<Vec<u8>, LookupError> {
        Ok(self.previous_output(tx, input_index).await?.lock.args)
    }
}
