//! The shared handler skeleton: guard, derive, persist.
//!
//! Handlers only implement [`ActionHandler::derive`]; the version guard and
//! logging happen in [`prepare`], the single persistence call in [`commit`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use das_state_fetcher::{is_current_version_tx, ContractRegistry, HistoricalStateProvider};
use das_types::{AccountStatus, DasContractName};

use crate::dao::{
    DbDao, TableAccountInfo, TableIncomeCellInfo, TableRecordsInfo, TableTransactionInfo,
};
use crate::error::ParseError;

use super::HandleRequest;

/// Read-only collaborators shared by all handlers.
#[derive(Clone)]
pub struct ParseContext {
    pub registry: Arc<ContractRegistry>,
    pub lookup: Arc<HistoricalStateProvider>,
}

/// Rows one transaction produces, one variant per persistence method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteSet {
    EditRecords {
        account: TableAccountInfo,
        records: Vec<TableRecordsInfo>,
        tx: TableTransactionInfo,
    },
    EditManager {
        account: TableAccountInfo,
        tx: TableTransactionInfo,
    },
    RenewAccount {
        spent_outpoints: Vec<String>,
        income_cells: Vec<TableIncomeCellInfo>,
        account: TableAccountInfo,
        tx: TableTransactionInfo,
    },
    TransferAccount {
        account: TableAccountInfo,
        tx: TableTransactionInfo,
        records: Vec<TableRecordsInfo>,
    },
    ForceRecoverAccountStatus {
        old_status: AccountStatus,
        account: TableAccountInfo,
        tx: TableTransactionInfo,
    },
    RecycleExpiredAccount {
        account_id: String,
        enable_sub_account: u8,
        tx: TableTransactionInfo,
    },
    AccountCrossChain {
        account: TableAccountInfo,
        tx: TableTransactionInfo,
    },
}

impl WriteSet {
    /// The ledger row; its outpoint is the idempotency key of the whole set.
    pub fn transaction(&self) -> &TableTransactionInfo {
        match self {
            WriteSet::EditRecords { tx, .. }
            | WriteSet::EditManager { tx, .. }
            | WriteSet::RenewAccount { tx, .. }
            | WriteSet::TransferAccount { tx, .. }
            | WriteSet::ForceRecoverAccountStatus { tx, .. }
            | WriteSet::RecycleExpiredAccount { tx, .. }
            | WriteSet::AccountCrossChain { tx, .. } => tx,
        }
    }

    pub async fn persist(&self, dao: &dyn DbDao) -> anyhow::Result<()> {
        match self {
            WriteSet::EditRecords { account, records, tx } => {
                dao.create_records_infos(account, records, tx).await
            }
            WriteSet::EditManager { account, tx } => dao.edit_manager(account, tx).await,
            WriteSet::RenewAccount {
                spent_outpoints,
                income_cells,
                account,
                tx,
            } => {
                dao.renew_account(spent_outpoints, income_cells, account, tx)
                    .await
            }
            WriteSet::TransferAccount { account, tx, records } => {
                dao.transfer_account(account, tx, records).await
            }
            WriteSet::ForceRecoverAccountStatus {
                old_status,
                account,
                tx,
            } => {
                dao.force_recover_account_status(*old_status, account, tx)
                    .await
            }
            WriteSet::RecycleExpiredAccount {
                account_id,
                enable_sub_account,
                tx,
            } => {
                dao.recycle_expired_account(account_id, *enable_sub_account, tx)
                    .await
            }
            WriteSet::AccountCrossChain { account, tx } => dao.account_cross_chain(account, tx).await,
        }
    }
}

/// Per-action derivation of rows from a transaction.
#[async_trait::async_trait]
pub trait ActionHandler: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Contract whose current version the transaction must use.
    fn contract(&self) -> DasContractName {
        DasContractName::AccountCellType
    }

    async fn derive(&self, ctx: &ParseContext, req: &HandleRequest) -> Result<WriteSet, ParseError>;
}

/// Version guard and derivation. `None` means the transaction was skipped.
///
/// Nothing is written here, so derivations of independent requests may run
/// concurrently.
pub async fn prepare(
    handler: &dyn ActionHandler,
    ctx: &ParseContext,
    req: &HandleRequest,
) -> Result<Option<WriteSet>, ParseError> {
    if !is_current_version_tx(&req.tx, &ctx.registry, handler.contract())? {
        warn!(
            handler = handler.name(),
            tx_hash = %req.tx_hash,
            block_number = req.block_number,
            "not current version tx, skipping"
        );
        return Ok(None);
    }
    info!(
        handler = handler.name(),
        tx_hash = %req.tx_hash,
        block_number = req.block_number,
        "handling transaction"
    );

    let writes = handler.derive(ctx, req).await?;
    let tx = writes.transaction();
    info!(
        handler = handler.name(),
        account = %tx.account,
        address = %tx.address,
        capacity = tx.capacity,
        "derived rows"
    );
    Ok(Some(writes))
}

/// The single persistence call for a derived write set.
pub async fn commit(
    handler_name: &'static str,
    dao: &dyn DbDao,
    writes: &WriteSet,
) -> Result<(), ParseError> {
    if let Err(e) = writes.persist(dao).await {
        error!(
            handler = handler_name,
            error = %e,
            tx = %serde_json::to_string(writes.transaction()).unwrap_or_default(),
            "persist failed"
        );
        return Err(ParseError::Persist(e));
    }
    Ok(())
}
