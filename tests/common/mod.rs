#![allow(dead_code)]
//! Shared fixtures for integration tests.
//!
//! Transactions are assembled with the same witness encoders the decoder
//! reads, then run through a [`BlockParser`] wired to an in-memory chain and
//! an in-memory store.

use std::sync::Arc;

use das_indexer::block_parser::{BlockParser, HandleRequest, ParseContext};
use das_indexer::dao::MemoryDao;
use das_resolver::DasAlgorithmId;
use das_state_fetcher::{
    ChainClient, ContractRegistry, FetchedTransaction, HistoricalStateProvider, MemoryChain,
};
use das_types::{
    CellInput, CellOutput, DasContractName, Header, OutPoint, Script, Transaction,
    TransactionView, H256,
};
use das_witness::{
    encode_das_witness, pack_account_cell_output_data, AccountCellData, ActionData, Data,
    DataEntity, DataType,
};

pub const ACCOUNT_CELL_TYPE: H256 = H256([0xa1; 32]);
pub const INCOME_CELL_TYPE: H256 = H256([0xb2; 32]);
/// A type id no registry entry points at.
pub const OUTDATED_ACCOUNT_CELL_TYPE: H256 = H256([0xa0; 32]);

pub const BLOCK_NUMBER: u64 = 12_000_000;
pub const BLOCK_TIMESTAMP: u64 = 1_700_000_000_000;

/// Account cell capacity used across fixtures.
pub const ACCOUNT_CELL_CAPACITY: u64 = 20_600_000_000;

pub const ALICE_OWNER: &str = "0x1111111111111111111111111111111111111111";
pub const ALICE_MANAGER: &str = "0xabc0000000000000000000000000000000000001";
pub const BOB: &str = "0x2222222222222222222222222222222222222222";

pub fn registry() -> ContractRegistry {
    ContractRegistry::new()
        .with_contract(DasContractName::AccountCellType, ACCOUNT_CELL_TYPE)
        .with_contract(DasContractName::IncomeCellType, INCOME_CELL_TYPE)
}

fn payload(address: &str) -> Vec<u8> {
    hex::decode(address.trim_start_matches("0x")).unwrap()
}

/// das-lock args for an owner and a manager, both EVM addresses.
pub fn eth_lock_args(owner: &str, manager: &str) -> Vec<u8> {
    let mut args = vec![DasAlgorithmId::Eth.as_u8()];
    args.extend(payload(owner));
    args.push(DasAlgorithmId::Eth.as_u8());
    args.extend(payload(manager));
    args
}

pub fn hash(byte: u8) -> H256 {
    H256([byte; 32])
}

fn script(code_hash: H256, args: Vec<u8>) -> Script {
    Script {
        code_hash,
        args,
        ..Default::default()
    }
}

/// Builds a transaction the way the DAS contracts lay them out.
pub struct TxBuilder {
    tx: Transaction,
    account_cell_type: H256,
}

impl TxBuilder {
    pub fn new(action: &str) -> Self {
        let mut tx = Transaction::default();
        tx.witnesses.push(encode_das_witness(
            DataType::ACTION_DATA,
            &ActionData::new(action, Vec::new()).encode(),
        ));
        Self {
            tx,
            account_cell_type: ACCOUNT_CELL_TYPE,
        }
    }

    /// Account cells built from here on use `type_id`.
    pub fn account_cell_type(mut self, type_id: H256) -> Self {
        self.account_cell_type = type_id;
        self
    }

    pub fn input(mut self, tx_hash: H256, index: u32) -> Self {
        self.tx
            .inputs
            .push(CellInput::new(OutPoint::new(tx_hash, index)));
        self
    }

    /// An account cell output with its `expired_at` in the output data.
    pub fn account_output(mut self, lock_args: Vec<u8>, account: &str, expired_at: u64) -> Self {
        let id = das_types::account_id_from_name(account);
        self.tx.outputs.push(CellOutput {
            capacity: ACCOUNT_CELL_CAPACITY,
            lock: script(H256::default(), lock_args),
            type_: Some(script(self.account_cell_type, Vec::new())),
        });
        self.tx
            .outputs_data
            .push(pack_account_cell_output_data(&id, expired_at, account));
        self
    }

    pub fn output(mut self, capacity: u64, lock_args: Vec<u8>, type_id: Option<H256>) -> Self {
        self.tx.outputs.push(CellOutput {
            capacity,
            lock: script(H256::default(), lock_args),
            type_: type_id.map(|t| script(t, Vec::new())),
        });
        self.tx.outputs_data.push(Vec::new());
        self
    }

    /// One account cell witness with optional old and new entities.
    pub fn account_witness(
        mut self,
        old: Option<(AccountCellData, u32)>,
        new: Option<(AccountCellData, u32)>,
    ) -> Self {
        let entity = |side: Option<(AccountCellData, u32)>| {
            side.map(|(data, index)| DataEntity {
                version: 3,
                index,
                entity: data.encode(3),
            })
        };
        let data = Data {
            old: entity(old),
            new: entity(new),
            dep: None,
        };
        self.tx
            .witnesses
            .push(encode_das_witness(DataType::ACCOUNT_CELL, &data.encode()));
        self
    }

    /// A `das` witness with an arbitrary payload.
    pub fn raw_witness(mut self, data_type: DataType, payload: &[u8]) -> Self {
        self.tx.witnesses.push(encode_das_witness(data_type, payload));
        self
    }

    pub fn build(self) -> Transaction {
        self.tx
    }
}

pub fn request(tx: Transaction, tx_hash: H256, action: &str) -> HandleRequest {
    request_at(tx, tx_hash, action, BLOCK_NUMBER)
}

pub fn request_at(tx: Transaction, tx_hash: H256, action: &str, block_number: u64) -> HandleRequest {
    HandleRequest {
        tx,
        tx_hash,
        block_number,
        block_timestamp: BLOCK_TIMESTAMP,
        action: action.to_string(),
    }
}

/// Parser, chain and store wired together.
pub struct Harness {
    pub chain: Arc<MemoryChain>,
    pub dao: Arc<MemoryDao>,
    pub parser: BlockParser,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(0)
    }

    /// Every chain query yields to the runtime `yields` times before answering,
    /// so requests that need a lookup finish derivation after those that don't.
    pub fn with_slow_chain(yields: usize) -> Self {
        Self::build(yields)
    }

    fn build(yields: usize) -> Self {
        let chain = Arc::new(MemoryChain::new());
        let dao = Arc::new(MemoryDao::new());
        let client: Arc<dyn ChainClient> = if yields == 0 {
            chain.clone()
        } else {
            Arc::new(SlowChain {
                inner: chain.clone(),
                yields,
            })
        };
        let ctx = ParseContext {
            registry: Arc::new(registry()),
            lookup: Arc::new(HistoricalStateProvider::new(client, 64)),
        };
        let parser = BlockParser::new(ctx, dao.clone(), 4);
        Self { chain, dao, parser }
    }

    /// Commit a transaction whose outputs later transactions consume.
    pub fn commit_previous(&self, tx_hash: H256, outputs: Vec<CellOutput>) {
        let inner = Transaction {
            outputs_data: vec![Vec::new(); outputs.len()],
            outputs,
            ..Default::default()
        };
        self.chain.insert_committed(
            TransactionView {
                inner,
                hash: tx_hash,
            },
            Header {
                hash: hash(0xee),
                number: BLOCK_NUMBER - 1,
                timestamp: BLOCK_TIMESTAMP - 1,
            },
        );
    }
}

/// A plain cell locked by `lock_args`.
pub fn cell(capacity: u64, lock_args: Vec<u8>) -> CellOutput {
    CellOutput {
        capacity,
        lock: script(H256::default(), lock_args),
        type_: None,
    }
}

struct SlowChain {
    inner: Arc<MemoryChain>,
    yields: usize,
}

impl SlowChain {
    async fn stall(&self) {
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait::async_trait]
impl ChainClient for SlowChain {
    async fn get_transaction(&self, hash: &H256) -> anyhow::Result<Option<FetchedTransaction>> {
        self.stall().await;
        self.inner.get_transaction(hash).await
    }

    async fn get_header(&self, block_hash: &H256) -> anyhow::Result<Option<Header>> {
        self.stall().await;
        self.inner.get_header(block_hash).await
    }
}
