//! Per-action projection of account cell transactions.
//!
//! - [`pipeline`]: the shared guard / derive / persist skeleton
//! - [`action_account_cell`]: one [`ActionHandler`] per account cell action
//!
//! [`BlockParser`] dispatches a transaction to its handler by action name.

pub mod action_account_cell;
pub mod pipeline;

pub use pipeline::{ActionHandler, ParseContext, WriteSet};

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use das_types::{outpoint_to_string, DasAction, Transaction, H256};
use das_witness::{ActionData, DecodeError};

use crate::dao::DbDao;
use crate::error::{HandlerError, ParseError};

use action_account_cell::{
    AccountCrossChain, EditManager, EditRecords, ForceRecoverAccountStatus, RecycleExpiredAccount,
    RenewAccount, TransferAccount,
};

/// One transaction to project, with its block context.
#[derive(Debug, Clone)]
pub struct HandleRequest {
    pub tx: Transaction,
    pub tx_hash: H256,
    pub block_number: u64,
    pub block_timestamp: u64,
    /// Action name the transaction declares.
    pub action: String,
}

impl HandleRequest {
    /// `"{tx_hash}-{index}"` for a cell of this transaction.
    pub fn outpoint(&self, index: u32) -> String {
        outpoint_to_string(&self.tx_hash, index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleOutcome {
    /// Rows were written (or already present).
    Applied,
    /// The transaction uses a contract version this indexer does not follow.
    Skipped,
    /// No handler for the action.
    Ignored,
}

pub struct BlockParser {
    ctx: ParseContext,
    dao: Arc<dyn DbDao>,
    handlers: HashMap<&'static str, Arc<dyn ActionHandler>>,
    concurrency: usize,
}

impl BlockParser {
    /// A parser with every account cell action registered.
    pub fn new(ctx: ParseContext, dao: Arc<dyn DbDao>, concurrency: usize) -> Self {
        let mut parser = Self {
            ctx,
            dao,
            handlers: HashMap::new(),
            concurrency: concurrency.max(1),
        };
        parser.register(DasAction::EDIT_RECORDS, Arc::new(EditRecords));
        parser.register(DasAction::EDIT_MANAGER, Arc::new(EditManager));
        parser.register(DasAction::RENEW_ACCOUNT, Arc::new(RenewAccount));
        parser.register(DasAction::TRANSFER_ACCOUNT, Arc::new(TransferAccount));
        parser.register(
            DasAction::FORCE_RECOVER_ACCOUNT_STATUS,
            Arc::new(ForceRecoverAccountStatus),
        );
        parser.register(
            DasAction::RECYCLE_EXPIRED_ACCOUNT,
            Arc::new(RecycleExpiredAccount),
        );
        let cross_chain: Arc<dyn ActionHandler> = Arc::new(AccountCrossChain);
        parser.register(DasAction::LOCK_ACCOUNT_FOR_CROSS_CHAIN, cross_chain.clone());
        parser.register(DasAction::UNLOCK_ACCOUNT_FOR_CROSS_CHAIN, cross_chain);
        parser
    }

    pub fn register(&mut self, action: &'static str, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(action, handler);
    }

    pub fn is_supported(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    pub fn context(&self) -> &ParseContext {
        &self.ctx
    }

    /// The action a transaction declares in its action witness.
    pub fn classify(tx: &Transaction) -> Result<ActionData, DecodeError> {
        ActionData::from_tx(tx)
    }

    pub async fn handle(&self, req: &HandleRequest) -> Result<HandleOutcome, HandlerError> {
        let prepared = self.prepare(req).await;
        self.commit(req, prepared).await
    }

    /// Handle a batch with bounded concurrency.
    ///
    /// Derivations overlap, but write sets are persisted one at a time in
    /// input order, so rows of the same account land in block order. Results
    /// come back in input order.
    pub async fn handle_many(
        &self,
        requests: Vec<HandleRequest>,
    ) -> Vec<Result<HandleOutcome, HandlerError>> {
        stream::iter(requests)
            .map(|req| async move {
                let prepared = self.prepare(&req).await;
                (req, prepared)
            })
            .buffered(self.concurrency)
            .then(|(req, prepared)| async move { self.commit(&req, prepared).await })
            .collect()
            .await
    }

    async fn prepare(&self, req: &HandleRequest) -> Result<Prepared, HandlerError> {
        let Some(handler) = self.handlers.get(req.action.as_str()) else {
            warn!(action = %req.action, tx_hash = %req.tx_hash, "unsupported action, ignoring");
            return Ok(Prepared::Ignored);
        };
        debug!(action = %req.action, handler = handler.name(), "dispatching");

        let writes = pipeline::prepare(handler.as_ref(), &self.ctx, req)
            .await
            .map_err(|source| handler_error(handler.name(), req, source))?;
        Ok(match writes {
            Some(writes) => Prepared::Ready {
                handler: handler.name(),
                writes,
            },
            None => Prepared::Skipped,
        })
    }

    async fn commit(
        &self,
        req: &HandleRequest,
        prepared: Result<Prepared, HandlerError>,
    ) -> Result<HandleOutcome, HandlerError> {
        match prepared? {
            Prepared::Ignored => Ok(HandleOutcome::Ignored),
            Prepared::Skipped => Ok(HandleOutcome::Skipped),
            Prepared::Ready { handler, writes } => {
                pipeline::commit(handler, self.dao.as_ref(), &writes)
                    .await
                    .map_err(|source| handler_error(handler, req, source))?;
                Ok(HandleOutcome::Applied)
            }
        }
    }
}

/// A request after guard and derivation, before persistence.
enum Prepared {
    Ignored,
    Skipped,
    Ready {
        handler: &'static str,
        writes: WriteSet,
    },
}

fn handler_error(handler: &'static str, req: &HandleRequest, source: ParseError) -> HandlerError {
    HandlerError {
        handler,
        tx_hash: req.tx_hash,
        block_number: req.block_number,
        source,
    }
}
