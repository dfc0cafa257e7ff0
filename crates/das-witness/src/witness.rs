//! `das` witness framing and the `Data` envelope shared by all cell entities.

use das_types::Transaction;

use crate::error::{DecodeError, DecodeResult};
use crate::molecule::{self, Table};

/// Every protocol witness starts with these bytes.
pub const WITNESS_PREFIX: &[u8] = b"das";

const FRAME_HEADER_LEN: usize = 7;

/// Discriminant following the `das` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataType(pub u32);

impl DataType {
    pub const ACTION_DATA: DataType = DataType(0);
    pub const ACCOUNT_CELL: DataType = DataType(1);
    pub const ACCOUNT_SALE_CELL: DataType = DataType(2);
    pub const ACCOUNT_AUCTION_CELL: DataType = DataType(3);
    pub const PROPOSAL_CELL: DataType = DataType(4);
    pub const PRE_ACCOUNT_CELL: DataType = DataType(5);
    pub const INCOME_CELL: DataType = DataType(6);
    pub const OFFER_CELL: DataType = DataType(7);
    pub const SUB_ACCOUNT: DataType = DataType(8);

    pub const CONFIG_CELL_ACCOUNT: DataType = DataType(100);
    pub const CONFIG_CELL_APPLY: DataType = DataType(101);
    pub const CONFIG_CELL_INCOME: DataType = DataType(103);
    pub const CONFIG_CELL_MAIN: DataType = DataType(104);
    pub const CONFIG_CELL_PRICE: DataType = DataType(105);
    pub const CONFIG_CELL_PROPOSAL: DataType = DataType(106);
    pub const CONFIG_CELL_PROFIT_RATE: DataType = DataType(107);
    pub const CONFIG_CELL_RELEASE: DataType = DataType(109);
    pub const CONFIG_CELL_SECONDARY_MARKET: DataType = DataType(113);
    pub const CONFIG_CELL_REVERSE_RESOLUTION: DataType = DataType(114);

    pub fn is_config_cell(&self) -> bool {
        self.0 >= 100
    }
}

/// One protocol witness found in a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DasWitness<'a> {
    /// Position in `tx.witnesses`.
    pub position: usize,
    pub data_type: DataType,
    pub payload: &'a [u8],
}

/// Parse one witness, returning `None` for lock witnesses and anything too short
/// to carry the `das` frame.
pub fn parse_das_witness(position: usize, raw: &[u8]) -> Option<DasWitness<'_>> {
    if raw.len() < FRAME_HEADER_LEN || !raw.starts_with(WITNESS_PREFIX) {
        return None;
    }
    let mut tag = [0u8; 4];
    tag.copy_from_slice(&raw[3..FRAME_HEADER_LEN]);
    Some(DasWitness {
        position,
        data_type: DataType(u32::from_le_bytes(tag)),
        payload: &raw[FRAME_HEADER_LEN..],
    })
}

/// All protocol witnesses of a transaction, in witness order.
pub fn das_witnesses(tx: &Transaction) -> impl Iterator<Item = DasWitness<'_>> {
    tx.witnesses
        .iter()
        .enumerate()
        .filter_map(|(position, raw)| parse_das_witness(position, raw))
}

/// First protocol witness of the given type.
pub fn find_witness(tx: &Transaction, data_type: DataType) -> Option<DasWitness<'_>> {
    das_witnesses(tx).find(|w| w.data_type == data_type)
}

pub fn encode_das_witness(data_type: DataType, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    out.extend_from_slice(WITNESS_PREFIX);
    out.extend_from_slice(&data_type.0.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Which state a `Data` entity describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSide {
    /// Cell consumed by the transaction (an input).
    Old,
    /// Cell produced by the transaction (an output).
    New,
    /// Cell referenced as a dependency.
    Dep,
}

/// A versioned cell entity and the index of the cell it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEntity {
    pub version: u32,
    pub index: u32,
    pub entity: Vec<u8>,
}

impl DataEntity {
    pub fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let table = Table::parse(slice, "DataEntity", 3)?;
        Ok(Self {
            version: table.u32(0, "DataEntity.version")?,
            index: table.u32(1, "DataEntity.index")?,
            entity: table.bytes(2, "DataEntity.entity")?.to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        molecule::pack_table(&[
            molecule::pack_u32(self.version),
            molecule::pack_u32(self.index),
            molecule::pack_bytes(&self.entity),
        ])
    }
}

/// The `{ old, new, dep }` envelope around a cell entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Data {
    pub old: Option<DataEntity>,
    pub new: Option<DataEntity>,
    pub dep: Option<DataEntity>,
}

impl Data {
    pub fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let table = Table::parse(slice, "Data", 3)?;
        let side = |i: usize| -> DecodeResult<Option<DataEntity>> {
            molecule::read_option(table.field(i)?)
                .map(DataEntity::decode)
                .transpose()
        };
        Ok(Self {
            old: side(0)?,
            new: side(1)?,
            dep: side(2)?,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let side = |entity: &Option<DataEntity>| {
            molecule::pack_option(entity.as_ref().map(DataEntity::encode))
        };
        molecule::pack_table(&[side(&self.old), side(&self.new), side(&self.dep)])
    }

    pub fn entity(&self, side: DataSide) -> Option<&DataEntity> {
        match side {
            DataSide::Old => self.old.as_ref(),
            DataSide::New => self.new.as_ref(),
            DataSide::Dep => self.dep.as_ref(),
        }
    }
}

/// Decode every `Data` envelope of `data_type` and keep the entities on `side`.
pub fn entities_from_tx(
    tx: &Transaction,
    data_type: DataType,
    side: DataSide,
) -> DecodeResult<Vec<DataEntity>> {
    let mut entities = Vec::new();
    for witness in das_witnesses(tx).filter(|w| w.data_type == data_type) {
        let data = Data::decode(witness.payload)?;
        let entity = match side {
            DataSide::Old => data.old,
            DataSide::New => data.new,
            DataSide::Dep => data.dep,
        };
        if let Some(entity) = entity {
            entities.push(entity);
        }
    }
    Ok(entities)
}

/// Raw payload of the first witness of `data_type`, or `NotFound`.
pub fn witness_payload(tx: &Transaction, data_type: DataType) -> DecodeResult<&[u8]> {
    find_witness(tx, data_type)
        .map(|w| w.payload)
        .ok_or_else(|| DecodeError::NotFound(format!("witness of data type {}", data_type.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32) -> DataEntity {
        DataEntity {
            version: 3,
            index,
            entity: vec![index as u8; 4],
        }
    }

    #[test]
    fn test_framing_skips_lock_witnesses() {
        let tx = Transaction {
            witnesses: vec![
                vec![0x55; 85],
                b"das".to_vec(),
                encode_das_witness(DataType::ACTION_DATA, b"abc"),
                encode_das_witness(DataType::CONFIG_CELL_PRICE, &[]),
            ],
            ..Default::default()
        };
        let found: Vec<_> = das_witnesses(&tx).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].position, 2);
        assert_eq!(found[0].data_type, DataType::ACTION_DATA);
        assert_eq!(found[0].payload, b"abc");
        assert!(found[1].data_type.is_config_cell());
        assert!(find_witness(&tx, DataType::ACCOUNT_CELL).is_none());
        assert!(witness_payload(&tx, DataType::ACCOUNT_CELL).is_err());
    }

    #[test]
    fn test_data_envelope_sides() {
        let data = Data {
            old: Some(entity(0)),
            new: Some(entity(1)),
            dep: None,
        };
        let decoded = Data::decode(&data.encode()).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(decoded.entity(DataSide::New).unwrap().index, 1);
        assert!(decoded.entity(DataSide::Dep).is_none());
    }

    #[test]
    fn test_entities_from_tx_filters_side() {
        let first = Data {
            old: Some(entity(0)),
            new: Some(entity(0)),
            dep: None,
        };
        let second = Data {
            old: Some(entity(1)),
            new: None,
            dep: None,
        };
        let tx = Transaction {
            witnesses: vec![
                encode_das_witness(DataType::ACCOUNT_CELL, &first.encode()),
                encode_das_witness(DataType::ACCOUNT_CELL, &second.encode()),
                encode_das_witness(DataType::INCOME_CELL, &first.encode()),
            ],
            ..Default::default()
        };
        let old = entities_from_tx(&tx, DataType::ACCOUNT_CELL, DataSide::Old).unwrap();
        assert_eq!(old.iter().map(|e| e.index).collect::<Vec<_>>(), vec![0, 1]);
        let new = entities_from_tx(&tx, DataType::ACCOUNT_CELL, DataSide::New).unwrap();
        assert_eq!(new.len(), 1);
    }

    #[test]
    fn test_corrupt_envelope_is_decode_error() {
        let tx = Transaction {
            witnesses: vec![encode_das_witness(DataType::ACCOUNT_CELL, &[9, 0, 0, 0, 1])],
            ..Default::default()
        };
        assert!(entities_from_tx(&tx, DataType::ACCOUNT_CELL, DataSide::New).is_err());
    }
}
