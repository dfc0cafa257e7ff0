//! Chain query abstraction.
//!
//! Handlers never talk to the node directly; they go through [`ChainClient`] so
//! the same code runs against the RPC client and against in-memory fixtures.

use anyhow::{anyhow, Result};

use das_transport::CkbRpcClient;
use das_types::{Header, TransactionView, H256};

/// A transaction and the block that committed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedTransaction {
    pub view: TransactionView,
    /// `None` while the transaction is pending.
    pub block_hash: Option<H256>,
}

/// Read-only chain queries.
///
/// Errors are transport failures and are treated as transient by callers.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetch a transaction by hash. `Ok(None)` if the node does not know it.
    async fn get_transaction(&self, hash: &H256) -> Result<Option<FetchedTransaction>>;

    /// Fetch a block header by block hash.
    async fn get_header(&self, block_hash: &H256) -> Result<Option<Header>>;
}

/// The RPC client is blocking; calls run on the blocking pool.
#[async_trait::async_trait]
impl ChainClient for CkbRpcClient {
    async fn get_transaction(&self, hash: &H256) -> Result<Option<FetchedTransaction>> {
        let client = self.clone();
        let hash = *hash;
        let result = tokio::task::spawn_blocking(move || client.get_transaction(&hash))
            .await
            .map_err(|e| anyhow!("get_transaction task failed: {}", e))??;
        Ok(result.and_then(|r| {
            r.transaction.map(|view| FetchedTransaction {
                view,
                block_hash: r.tx_status.block_hash,
            })
        }))
    }

    async fn get_header(&self, block_hash: &H256) -> Result<Option<Header>> {
        let client = self.clone();
        let block_hash = *block_hash;
        tokio::task::spawn_blocking(move || client.get_header(&block_hash))
            .await
            .map_err(|e| anyhow!("get_header task failed: {}", e))?
    }
}
