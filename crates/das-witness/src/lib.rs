//! Witness decoding for DAS transactions.
//!
//! Transactions carry their cell entities in witnesses framed as
//! `b"das" ++ data_type ++ payload`. This crate decodes:
//!
//! - [`molecule`]: the binary schema encoding (reader and encoder)
//! - [`witness`]: the witness framing and the `Data { old, new, dep }` envelope
//! - [`account_cell`]: account cell entities and [`AccountCellDataBuilder`]
//! - [`config_cell`]: protocol parameter cells as the [`ConfigCell`] tagged union
//! - [`action_data`]: the action name a transaction declares

pub mod account_cell;
pub mod action_data;
pub mod config_cell;
pub mod error;
pub mod molecule;
pub mod witness;

pub use account_cell::{
    pack_account_cell_output_data, AccountChar, AccountCellData, AccountCellDataBuilder, Record,
};
pub use action_data::ActionData;
pub use config_cell::{
    config_cell_from_tx, ConfigCell, ConfigCellAccount, ConfigCellApply, ConfigCellEntity,
    ConfigCellIncome, ConfigCellMain, ConfigCellPrice, ConfigCellProfitRate,
    ConfigCellReverseResolution, ConfigCellSecondaryMarket, PriceConfig, MAX_PRICED_LENGTH,
};
pub use error::{DecodeError, DecodeResult};
pub use witness::{
    das_witnesses, encode_das_witness, find_witness, Data, DataEntity, DataSide, DataType,
    DasWitness,
};
