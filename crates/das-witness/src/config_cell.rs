//! Config cells: protocol parameters published on chain, one witness per kind.
//!
//! Config witnesses carry the entity table directly, without the `Data` envelope.

use std::collections::BTreeMap;

use das_types::Transaction;

use crate::error::{DecodeError, DecodeResult};
use crate::molecule::{self, Table};
use crate::witness::{witness_payload, DataType};

/// Lengths above this tier are priced as this tier.
pub const MAX_PRICED_LENGTH: u8 = 5;

/// A config cell entity decodable from its witness.
pub trait ConfigCellEntity: Sized {
    const KIND: DataType;

    fn decode(slice: &[u8]) -> DecodeResult<Self>;
}

/// Decode the config cell of type `T` from a transaction's witnesses.
pub fn config_cell_from_tx<T: ConfigCellEntity>(tx: &Transaction) -> DecodeResult<T> {
    T::decode(witness_payload(tx, T::KIND)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCellAccount {
    pub max_length: u32,
    pub basic_capacity: u64,
    pub prepared_fee_capacity: u64,
    pub expiration_grace_period: u32,
    pub record_min_ttl: u32,
    pub record_size_limit: u32,
    pub transfer_account_fee: u64,
    pub edit_manager_fee: u64,
    pub edit_records_fee: u64,
    pub common_fee: u64,
}

impl ConfigCellEntity for ConfigCellAccount {
    const KIND: DataType = DataType::CONFIG_CELL_ACCOUNT;

    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let t = Table::parse(slice, "ConfigCellAccount", 10)?;
        Ok(Self {
            max_length: t.u32(0, "ConfigCellAccount.max_length")?,
            basic_capacity: t.u64(1, "ConfigCellAccount.basic_capacity")?,
            prepared_fee_capacity: t.u64(2, "ConfigCellAccount.prepared_fee_capacity")?,
            expiration_grace_period: t.u32(3, "ConfigCellAccount.expiration_grace_period")?,
            record_min_ttl: t.u32(4, "ConfigCellAccount.record_min_ttl")?,
            record_size_limit: t.u32(5, "ConfigCellAccount.record_size_limit")?,
            transfer_account_fee: t.u64(6, "ConfigCellAccount.transfer_account_fee")?,
            edit_manager_fee: t.u64(7, "ConfigCellAccount.edit_manager_fee")?,
            edit_records_fee: t.u64(8, "ConfigCellAccount.edit_records_fee")?,
            common_fee: t.u64(9, "ConfigCellAccount.common_fee")?,
        })
    }
}

impl ConfigCellAccount {
    pub fn encode(&self) -> Vec<u8> {
        molecule::pack_table(&[
            molecule::pack_u32(self.max_length),
            molecule::pack_u64(self.basic_capacity),
            molecule::pack_u64(self.prepared_fee_capacity),
            molecule::pack_u32(self.expiration_grace_period),
            molecule::pack_u32(self.record_min_ttl),
            molecule::pack_u32(self.record_size_limit),
            molecule::pack_u64(self.transfer_account_fee),
            molecule::pack_u64(self.edit_manager_fee),
            molecule::pack_u64(self.edit_records_fee),
            molecule::pack_u64(self.common_fee),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCellApply {
    pub apply_min_waiting_block_number: u32,
    pub apply_max_waiting_block_number: u32,
}

impl ConfigCellEntity for ConfigCellApply {
    const KIND: DataType = DataType::CONFIG_CELL_APPLY;

    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let t = Table::parse(slice, "ConfigCellApply", 2)?;
        Ok(Self {
            apply_min_waiting_block_number: t.u32(0, "ConfigCellApply.apply_min_waiting_block_number")?,
            apply_max_waiting_block_number: t.u32(1, "ConfigCellApply.apply_max_waiting_block_number")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCellIncome {
    pub basic_capacity: u64,
    pub max_records: u32,
    pub min_transfer_capacity: u64,
}

impl ConfigCellEntity for ConfigCellIncome {
    const KIND: DataType = DataType::CONFIG_CELL_INCOME;

    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let t = Table::parse(slice, "ConfigCellIncome", 3)?;
        Ok(Self {
            basic_capacity: t.u64(0, "ConfigCellIncome.basic_capacity")?,
            max_records: t.u32(1, "ConfigCellIncome.max_records")?,
            min_transfer_capacity: t.u64(2, "ConfigCellIncome.min_transfer_capacity")?,
        })
    }
}

/// Only the status flag is read; the remaining fields are type id tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCellMain {
    pub status: u8,
}

impl ConfigCellEntity for ConfigCellMain {
    const KIND: DataType = DataType::CONFIG_CELL_MAIN;

    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let t = Table::parse(slice, "ConfigCellMain", 1)?;
        Ok(Self {
            status: t.u8(0, "ConfigCellMain.status")?,
        })
    }
}

/// Registration and renewal price for one account length tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceConfig {
    pub length: u8,
    pub new: u64,
    pub renew: u64,
}

impl PriceConfig {
    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let t = Table::parse(slice, "PriceConfig", 3)?;
        Ok(Self {
            length: t.u8(0, "PriceConfig.length")?,
            new: t.u64(1, "PriceConfig.new")?,
            renew: t.u64(2, "PriceConfig.renew")?,
        })
    }

    fn encode(&self) -> Vec<u8> {
        molecule::pack_table(&[
            molecule::pack_u8(self.length),
            molecule::pack_u64(self.new),
            molecule::pack_u64(self.renew),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCellPrice {
    pub invited_discount: u32,
    pub prices: BTreeMap<u8, PriceConfig>,
}

impl ConfigCellEntity for ConfigCellPrice {
    const KIND: DataType = DataType::CONFIG_CELL_PRICE;

    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let t = Table::parse(slice, "ConfigCellPrice", 2)?;
        let discount = Table::parse(t.field(0)?, "DiscountConfig", 1)?;
        let prices = molecule::read_dynvec(t.field(1)?, "PriceConfigList")?
            .into_iter()
            .map(|item| PriceConfig::decode(item).map(|p| (p.length, p)))
            .collect::<DecodeResult<BTreeMap<_, _>>>()?;
        Ok(Self {
            invited_discount: discount.u32(0, "DiscountConfig.invited_discount")?,
            prices,
        })
    }
}

impl ConfigCellPrice {
    pub fn new(invited_discount: u32, prices: impl IntoIterator<Item = PriceConfig>) -> Self {
        Self {
            invited_discount,
            prices: prices.into_iter().map(|p| (p.length, p)).collect(),
        }
    }

    /// `(new, renew)` price for an account of `length` characters.
    ///
    /// Lengths above [`MAX_PRICED_LENGTH`] use that tier's price.
    pub fn account_price(&self, length: u8) -> DecodeResult<(u64, u64)> {
        let tier = length.min(MAX_PRICED_LENGTH);
        self.prices
            .get(&tier)
            .map(|p| (p.new, p.renew))
            .ok_or_else(|| DecodeError::NotFound(format!("price of length {}", tier)))
    }

    pub fn encode(&self) -> Vec<u8> {
        let discount = molecule::pack_table(&[molecule::pack_u32(self.invited_discount)]);
        let prices: Vec<Vec<u8>> = self.prices.values().map(PriceConfig::encode).collect();
        molecule::pack_table(&[discount, molecule::pack_dynvec(&prices)])
    }
}

/// Profit rates in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCellProfitRate {
    pub inviter: u32,
    pub channel: u32,
    pub proposal_create: u32,
    pub proposal_confirm: u32,
    pub income_consolidate: u32,
    pub sale_buyer_inviter: u32,
    pub sale_buyer_channel: u32,
    pub sale_das: u32,
}

impl ConfigCellEntity for ConfigCellProfitRate {
    const KIND: DataType = DataType::CONFIG_CELL_PROFIT_RATE;

    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let t = Table::parse(slice, "ConfigCellProfitRate", 8)?;
        Ok(Self {
            inviter: t.u32(0, "ConfigCellProfitRate.inviter")?,
            channel: t.u32(1, "ConfigCellProfitRate.channel")?,
            proposal_create: t.u32(2, "ConfigCellProfitRate.proposal_create")?,
            proposal_confirm: t.u32(3, "ConfigCellProfitRate.proposal_confirm")?,
            income_consolidate: t.u32(4, "ConfigCellProfitRate.income_consolidate")?,
            sale_buyer_inviter: t.u32(5, "ConfigCellProfitRate.sale_buyer_inviter")?,
            sale_buyer_channel: t.u32(6, "ConfigCellProfitRate.sale_buyer_channel")?,
            sale_das: t.u32(7, "ConfigCellProfitRate.sale_das")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCellReverseResolution {
    pub common_fee: u64,
    pub record_basic_capacity: u64,
    pub record_prepared_fee_capacity: u64,
}

impl ConfigCellEntity for ConfigCellReverseResolution {
    const KIND: DataType = DataType::CONFIG_CELL_REVERSE_RESOLUTION;

    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let t = Table::parse(slice, "ConfigCellReverseResolution", 3)?;
        Ok(Self {
            common_fee: t.u64(0, "ConfigCellReverseResolution.common_fee")?,
            record_basic_capacity: t.u64(1, "ConfigCellReverseResolution.record_basic_capacity")?,
            record_prepared_fee_capacity: t.u64(
                2,
                "ConfigCellReverseResolution.record_prepared_fee_capacity",
            )?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCellSecondaryMarket {
    pub common_fee: u64,
    pub sale_min_price: u64,
    pub sale_expiration_limit: u32,
    pub sale_description_bytes_limit: u32,
    pub sale_cell_basic_capacity: u64,
    pub sale_cell_prepared_fee_capacity: u64,
    pub offer_min_price: u64,
    pub offer_cell_basic_capacity: u64,
    pub offer_cell_prepared_fee_capacity: u64,
    pub offer_message_bytes_limit: u32,
}

impl ConfigCellEntity for ConfigCellSecondaryMarket {
    const KIND: DataType = DataType::CONFIG_CELL_SECONDARY_MARKET;

    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let t = Table::parse(slice, "ConfigCellSecondaryMarket", 10)?;
        Ok(Self {
            common_fee: t.u64(0, "ConfigCellSecondaryMarket.common_fee")?,
            sale_min_price: t.u64(1, "ConfigCellSecondaryMarket.sale_min_price")?,
            sale_expiration_limit: t.u32(2, "ConfigCellSecondaryMarket.sale_expiration_limit")?,
            sale_description_bytes_limit: t.u32(
                3,
                "ConfigCellSecondaryMarket.sale_description_bytes_limit",
            )?,
            sale_cell_basic_capacity: t.u64(4, "ConfigCellSecondaryMarket.sale_cell_basic_capacity")?,
            sale_cell_prepared_fee_capacity: t.u64(
                5,
                "ConfigCellSecondaryMarket.sale_cell_prepared_fee_capacity",
            )?,
            offer_min_price: t.u64(6, "ConfigCellSecondaryMarket.offer_min_price")?,
            offer_cell_basic_capacity: t.u64(
                7,
                "ConfigCellSecondaryMarket.offer_cell_basic_capacity",
            )?,
            offer_cell_prepared_fee_capacity: t.u64(
                8,
                "ConfigCellSecondaryMarket.offer_cell_prepared_fee_capacity",
            )?,
            offer_message_bytes_limit: t.u32(
                9,
                "ConfigCellSecondaryMarket.offer_message_bytes_limit",
            )?,
        })
    }
}

/// A decoded config cell, tagged by its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCell {
    Account(ConfigCellAccount),
    Apply(ConfigCellApply),
    Income(ConfigCellIncome),
    Main(ConfigCellMain),
    Price(ConfigCellPrice),
    ProfitRate(ConfigCellProfitRate),
    ReverseResolution(ConfigCellReverseResolution),
    SecondaryMarket(ConfigCellSecondaryMarket),
    /// Kinds the indexer carries but does not interpret (proposal, release).
    Opaque { kind: DataType, payload: Vec<u8> },
}

impl ConfigCell {
    pub fn decode(kind: DataType, slice: &[u8]) -> DecodeResult<Self> {
        Ok(match kind {
            DataType::CONFIG_CELL_ACCOUNT => ConfigCell::Account(ConfigCellAccount::decode(slice)?),
            DataType::CONFIG_CELL_APPLY => ConfigCell::Apply(ConfigCellApply::decode(slice)?),
            DataType::CONFIG_CELL_INCOME => ConfigCell::Income(ConfigCellIncome::decode(slice)?),
            DataType::CONFIG_CELL_MAIN => ConfigCell::Main(ConfigCellMain::decode(slice)?),
            DataType::CONFIG_CELL_PRICE => ConfigCell::Price(ConfigCellPrice::decode(slice)?),
            DataType::CONFIG_CELL_PROFIT_RATE => {
                ConfigCell::ProfitRate(ConfigCellProfitRate::decode(slice)?)
            }
            DataType::CONFIG_CELL_REVERSE_RESOLUTION => {
                ConfigCell::ReverseResolution(ConfigCellReverseResolution::decode(slice)?)
            }
            DataType::CONFIG_CELL_SECONDARY_MARKET => {
                ConfigCell::SecondaryMarket(ConfigCellSecondaryMarket::decode(slice)?)
            }
            kind if kind.is_config_cell() => ConfigCell::Opaque {
                kind,
                payload: slice.to_vec(),
            },
            other => {
                return Err(DecodeError::NotFound(format!(
                    "config cell kind for data type {}",
                    other.0
                )))
            }
        })
    }

    pub fn from_tx(tx: &Transaction, kind: DataType) -> DecodeResult<Self> {
        Self::decode(kind, witness_payload(tx, kind)?)
    }

    pub fn kind(&self) -> DataType {
        match self {
            ConfigCell::Account(_) => ConfigCellAccount::KIND,
            ConfigCell::Apply(_) => ConfigCellApply::KIND,
            ConfigCell::Income(_) => ConfigCellIncome::KIND,
            ConfigCell::Main(_) => ConfigCellMain::KIND,
            ConfigCell::Price(_) => ConfigCellPrice::KIND,
            ConfigCell::ProfitRate(_) => ConfigCellProfitRate::KIND,
            ConfigCell::ReverseResolution(_) => ConfigCellReverseResolution::KIND,
            ConfigCell::SecondaryMarket(_) => ConfigCellSecondaryMarket::KIND,
            ConfigCell::Opaque { kind, .. } => *kind,
        }
    }
}
