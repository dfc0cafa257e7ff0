//! Account cell lifecycle actions.

use tracing::info;

use das_resolver::{args_to_hex, DasAddressHex};
use das_types::constants::SERVICE_TYPE_REGISTER;
use das_types::{DasAction, DasContractName, Transaction};
use das_witness::{AccountCellDataBuilder, DataSide, DecodeError};

use crate::dao::{
    TableAccountInfo, TableIncomeCellInfo, TableRecordsInfo, TableTransactionInfo,
    INCOME_CELL_STATUS_UNMERGED,
};
use crate::error::ParseError;

use super::pipeline::{ActionHandler, ParseContext, WriteSet};
use super::HandleRequest;

/// Recycling consumes the expired account cell at this input.
const RECYCLED_CELL_INDEX: u32 = 1;

/// Owner and manager of the cell at output `index`.
fn output_identities(tx: &Transaction, index: u32) -> Result<(DasAddressHex, DasAddressHex), ParseError> {
    let args = tx
        .output_lock_args(index as usize)
        .ok_or_else(|| DecodeError::NotFound(format!("output {}", index)))?;
    Ok(args_to_hex(args)?)
}

fn account_row(req: &HandleRequest, builder: &AccountCellDataBuilder) -> TableAccountInfo {
    TableAccountInfo {
        block_number: req.block_number,
        outpoint: req.outpoint(builder.index),
        account_id: builder.account_id.to_hex(),
        account: builder.account.clone(),
        ..Default::default()
    }
}

fn with_owner(mut row: TableAccountInfo, owner: &DasAddressHex) -> TableAccountInfo {
    row.owner_chain_type = owner.chain_type.as_u8();
    row.owner = owner.address_hex.clone();
    row.owner_algorithm_id = owner.das_algorithm_id.as_u8();
    row
}

fn with_manager(mut row: TableAccountInfo, manager: &DasAddressHex) -> TableAccountInfo {
    row.manager_chain_type = manager.chain_type.as_u8();
    row.manager = manager.address_hex.clone();
    row.manager_algorithm_id = manager.das_algorithm_id.as_u8();
    row
}

fn transaction_row(
    req: &HandleRequest,
    builder: &AccountCellDataBuilder,
    action: &str,
    address: &DasAddressHex,
    capacity: u64,
    outpoint_index: u32,
) -> TableTransactionInfo {
    TableTransactionInfo {
        block_number: req.block_number,
        account_id: builder.account_id.to_hex(),
        account: builder.account.clone(),
        action: action.to_string(),
        service_type: SERVICE_TYPE_REGISTER,
        chain_type: address.chain_type.as_u8(),
        address: address.address_hex.clone(),
        capacity,
        outpoint: req.outpoint(outpoint_index),
        block_timestamp: req.block_timestamp,
    }
}

fn record_rows(builder: &AccountCellDataBuilder) -> Vec<TableRecordsInfo> {
    let account_id = builder.account_id.to_hex();
    builder
        .records
        .iter()
        .map(|r| TableRecordsInfo {
            account_id: account_id.clone(),
            account: builder.account.clone(),
            key: r.key.clone(),
            record_type: r.record_type.clone(),
            label: r.label.clone(),
            value: r.value.clone(),
            ttl: r.ttl.to_string(),
        })
        .collect()
}

/// Replaces the record set. The manager is the party allowed to edit records.
pub struct EditRecords;

#[async_trait::async_trait]
impl ActionHandler for EditRecords {
    fn name(&self) -> &'static str {
        DasAction::EDIT_RECORDS
    }

    async fn derive(&self, _ctx: &ParseContext, req: &HandleRequest) -> Result<WriteSet, ParseError> {
        let builder = AccountCellDataBuilder::from_tx(&req.tx, DataSide::New)?;
        let (_, manager) = output_identities(&req.tx, builder.index)?;

        let records = record_rows(&builder);
        info!(account = %builder.account, records = records.len(), address = %manager.address_hex, "edit records");
        Ok(WriteSet::EditRecords {
            account: account_row(req, &builder),
            records,
            tx: transaction_row(req, &builder, self.name(), &manager, 0, builder.index),
        })
    }
}

pub struct EditManager;

#[async_trait::async_trait]
impl ActionHandler for EditManager {
    fn name(&self) -> &'static str {
        DasAction::EDIT_MANAGER
    }

    async fn derive(&self, _ctx: &ParseContext, req: &HandleRequest) -> Result<WriteSet, ParseError> {
        let builder = AccountCellDataBuilder::from_tx(&req.tx, DataSide::New)?;
        let (owner, manager) = output_identities(&req.tx, builder.index)?;

        Ok(WriteSet::EditManager {
            account: with_manager(account_row(req, &builder), &manager),
            tx: transaction_row(req, &builder, self.name(), &owner, 0, builder.index),
        })
    }
}

/// Extends expiration. The paid fee lands in income cells.
pub struct RenewAccount;

#[async_trait::async_trait]
impl ActionHandler for RenewAccount {
    fn name(&self) -> &'static str {
        DasAction::RENEW_ACCOUNT
    }

    async fn derive(&self, ctx: &ParseContext, req: &HandleRequest) -> Result<WriteSet, ParseError> {
        let income_contract = ctx
            .registry
            .get_das_contract_info(DasContractName::IncomeCellType)?;

        let spent_outpoints: Vec<String> = req
            .tx
            .inputs
            .iter()
            .map(|input| input.previous_output.to_string())
            .collect();

        let mut capacity = 0u64;
        let mut income_cells = Vec::new();
        for (i, output) in req.tx.outputs.iter().enumerate() {
            let Some(type_script) = &output.type_ else {
                continue;
            };
            if !income_contract.is_same_type_id(&type_script.code_hash) {
                continue;
            }
            capacity = capacity.saturating_add(output.capacity);
            income_cells.push(TableIncomeCellInfo {
                block_number: req.block_number,
                action: self.name().to_string(),
                outpoint: req.outpoint(i as u32),
                capacity: output.capacity,
                block_timestamp: req.block_timestamp,
                status: INCOME_CELL_STATUS_UNMERGED,
            });
        }

        let builder = AccountCellDataBuilder::from_tx(&req.tx, DataSide::New)?;
        let (owner, _) = output_identities(&req.tx, builder.index)?;

        let mut account = account_row(req, &builder);
        account.expired_at = builder.expired_at;

        info!(account = %builder.account, expired_at = builder.expired_at, capacity, "renew account");
        Ok(WriteSet::RenewAccount {
            spent_outpoints,
            income_cells,
            account,
            tx: transaction_row(req, &builder, self.name(), &owner, capacity, builder.index),
        })
    }
}

/// Moves an account to a new owner. The ledger row names the previous owner,
/// the party that initiated the transfer.
pub struct TransferAccount;

#[async_trait::async_trait]
impl ActionHandler for TransferAccount {
    fn name(&self) -> &'static str {
        DasAction::TRANSFER_ACCOUNT
    }

    async fn derive(&self, ctx: &ParseContext, req: &HandleRequest) -> Result<WriteSet, ParseError> {
        let builder = AccountCellDataBuilder::from_tx(&req.tx, DataSide::New)?;
        let (owner, manager) = output_identities(&req.tx, builder.index)?;

        let old_builder = AccountCellDataBuilder::from_tx(&req.tx, DataSide::Old)?;
        let previous_args = ctx
            .lookup
            .previous_lock_args(&req.tx, old_builder.index as usize)
            .await?;
        let (previous_owner, _) = args_to_hex(&previous_args)?;

        info!(
            account = %builder.account,
            from = %previous_owner.address_hex,
            to = %owner.address_hex,
            "transfer account"
        );
        Ok(WriteSet::TransferAccount {
            account: with_manager(with_owner(account_row(req, &builder), &owner), &manager),
            tx: transaction_row(req, &builder, self.name(), &previous_owner, 0, builder.index),
            records: record_rows(&builder),
        })
    }
}

pub struct ForceRecoverAccountStatus;

#[async_trait::async_trait]
impl ActionHandler for ForceRecoverAccountStatus {
    fn name(&self) -> &'static str {
        DasAction::FORCE_RECOVER_ACCOUNT_STATUS
    }

    async fn derive(&self, _ctx: &ParseContext, req: &HandleRequest) -> Result<WriteSet, ParseError> {
        let old_builder = AccountCellDataBuilder::from_tx(&req.tx, DataSide::Old)?;
        let builder = AccountCellDataBuilder::from_tx(&req.tx, DataSide::New)?;
        let (owner, _) = output_identities(&req.tx, builder.index)?;

        let first_output = req.tx.outputs.first().map(|o| o.capacity).unwrap_or_default();
        let capacity = req.tx.outputs_capacity().saturating_sub(first_output);

        let mut account = account_row(req, &builder);
        account.status = builder.status;

        info!(
            account = %builder.account,
            old_status = %old_builder.status,
            status = %builder.status,
            "force recover account status"
        );
        Ok(WriteSet::ForceRecoverAccountStatus {
            old_status: old_builder.status,
            account,
            tx: transaction_row(req, &builder, self.name(), &owner, capacity, 0),
        })
    }
}

/// Deletes an expired account. The refund goes back to the previous owner.
pub struct RecycleExpiredAccount;

#[async_trait::async_trait]
impl ActionHandler for RecycleExpiredAccount {
    fn name(&self) -> &'static str {
        DasAction::RECYCLE_EXPIRED_ACCOUNT
    }

    async fn derive(&self, ctx: &ParseContext, req: &HandleRequest) -> Result<WriteSet, ParseError> {
        let mut builders = AccountCellDataBuilder::map_from_tx(&req.tx, DataSide::Old)?;
        let builder = builders
            .remove(&RECYCLED_CELL_INDEX)
            .ok_or(ParseError::BuilderNotFound {
                index: RECYCLED_CELL_INDEX,
            })?;

        let previous_args = ctx
            .lookup
            .previous_lock_args(&req.tx, RECYCLED_CELL_INDEX as usize)
            .await?;
        let capacity = req
            .tx
            .outputs
            .iter()
            .skip(1)
            .filter(|output| output.lock.args == previous_args)
            .fold(0u64, |acc, output| acc.saturating_add(output.capacity));
        let (previous_owner, _) = args_to_hex(&previous_args)?;

        info!(
            account = %builder.account,
            algorithm_id = previous_owner.das_algorithm_id.as_u8(),
            chain_type = previous_owner.chain_type.as_u8(),
            address = %previous_owner.address_hex,
            "recycle expired account"
        );
        Ok(WriteSet::RecycleExpiredAccount {
            account_id: builder.account_id.to_hex(),
            enable_sub_account: builder.enable_sub_account,
            tx: transaction_row(req, &builder, self.name(), &previous_owner, capacity, 0),
        })
    }
}

/// Locks or unlocks an account for cross-chain use; the action label comes
/// from the request.
pub struct AccountCrossChain;

#[async_trait::async_trait]
impl ActionHandler for AccountCrossChain {
    fn name(&self) -> &'static str {
        "account_cross_chain"
    }

    async fn derive(&self, _ctx: &ParseContext, req: &HandleRequest) -> Result<WriteSet, ParseError> {
        let builder = AccountCellDataBuilder::from_tx(&req.tx, DataSide::New)?;
        let (owner, manager) = output_identities(&req.tx, 0)?;

        let mut account = with_manager(with_owner(account_row(req, &builder), &owner), &manager);
        account.outpoint = req.outpoint(0);
        account.status = builder.status;

        Ok(WriteSet::AccountCrossChain {
            account,
            tx: transaction_row(req, &builder, &req.action, &owner, 0, 0),
        })
    }
}
