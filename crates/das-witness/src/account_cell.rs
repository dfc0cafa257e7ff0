//! Account cell entities and the builder handlers consume.

use std::collections::HashMap;

use das_types::{account_id_from_name, AccountId, AccountStatus, Transaction, ACCOUNT_SUFFIX};

use crate::error::{DecodeError, DecodeResult};
use crate::molecule::{self, Table};
use crate::witness::{entities_from_tx, DataEntity, DataSide, DataType};

/// Byte range of `expired_at` inside the account cell's output data.
const EXPIRED_AT_RANGE: std::ops::Range<usize> = 72..80;

/// Field counts per entity version.
const V2_FIELDS: usize = 8;
const V3_FIELDS: usize = 10;

/// Character set used when building entities from a plain name.
const CHAR_SET_EN: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountChar {
    pub char_set_name: u32,
    pub bytes: Vec<u8>,
}

impl AccountChar {
    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let table = Table::parse(slice, "AccountChar", 2)?;
        Ok(Self {
            char_set_name: table.u32(0, "AccountChar.char_set_name")?,
            bytes: table.bytes(1, "AccountChar.bytes")?.to_vec(),
        })
    }

    fn encode(&self) -> Vec<u8> {
        molecule::pack_table(&[
            molecule::pack_u32(self.char_set_name),
            molecule::pack_bytes(&self.bytes),
        ])
    }
}

/// A resolution record attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub record_type: String,
    pub key: String,
    pub label: String,
    pub value: String,
    pub ttl: u32,
}

impl Record {
    fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let table = Table::parse(slice, "Record", 5)?;
        Ok(Self {
            record_type: table.string(0, "Record.record_type")?,
            key: table.string(1, "Record.record_key")?,
            label: table.string(2, "Record.record_label")?,
            value: table.string(3, "Record.record_value")?,
            ttl: table.u32(4, "Record.record_ttl")?,
        })
    }

    fn encode(&self) -> Vec<u8> {
        molecule::pack_table(&[
            molecule::pack_bytes(self.record_type.as_bytes()),
            molecule::pack_bytes(self.key.as_bytes()),
            molecule::pack_bytes(self.label.as_bytes()),
            molecule::pack_bytes(self.value.as_bytes()),
            molecule::pack_u32(self.ttl),
        ])
    }
}

/// Decoded `AccountCellData` entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCellData {
    pub id: [u8; 20],
    pub account: Vec<AccountChar>,
    pub registered_at: u64,
    pub last_transfer_account_at: u64,
    pub last_edit_manager_at: u64,
    pub last_edit_records_at: u64,
    pub status: u8,
    pub records: Vec<Record>,
    /// Zero for version 2 entities.
    pub enable_sub_account: u8,
    pub renew_sub_account_price: u64,
}

impl AccountCellData {
    /// Entity for a full account name such as `"alice.bit"`, with a matching id.
    pub fn new(account: &str) -> Self {
        let chars = account.strip_suffix(ACCOUNT_SUFFIX).unwrap_or(account);
        Self {
            id: account_id_from_name(&format!("{}{}", chars, ACCOUNT_SUFFIX)).0,
            account: chars
                .chars()
                .map(|c| AccountChar {
                    char_set_name: CHAR_SET_EN,
                    bytes: c.to_string().into_bytes(),
                })
                .collect(),
            registered_at: 0,
            last_transfer_account_at: 0,
            last_edit_manager_at: 0,
            last_edit_records_at: 0,
            status: 0,
            records: Vec::new(),
            enable_sub_account: 0,
            renew_sub_account_price: 0,
        }
    }

    pub fn decode(slice: &[u8], version: u32) -> DecodeResult<Self> {
        let min_fields = match version {
            2 => V2_FIELDS,
            3 => V3_FIELDS,
            _ => {
                return Err(DecodeError::UnsupportedVersion {
                    what: "AccountCellData",
                    version,
                })
            }
        };
        let table = Table::parse(slice, "AccountCellData", min_fields)?;

        let account = molecule::read_dynvec(table.field(1)?, "AccountChars")?
            .into_iter()
            .map(AccountChar::decode)
            .collect::<DecodeResult<Vec<_>>>()?;
        let records = molecule::read_dynvec(table.field(7)?, "Records")?
            .into_iter()
            .map(Record::decode)
            .collect::<DecodeResult<Vec<_>>>()?;
        let (enable_sub_account, renew_sub_account_price) = if version >= 3 {
            (
                table.u8(8, "AccountCellData.enable_sub_account")?,
                table.u64(9, "AccountCellData.renew_sub_account_price")?,
            )
        } else {
            (0, 0)
        };

        Ok(Self {
            id: molecule::read_byte20(table.field(0)?, "AccountCellData.id")?,
            account,
            registered_at: table.u64(2, "AccountCellData.registered_at")?,
            last_transfer_account_at: table.u64(3, "AccountCellData.last_transfer_account_at")?,
            last_edit_manager_at: table.u64(4, "AccountCellData.last_edit_manager_at")?,
            last_edit_records_at: table.u64(5, "AccountCellData.last_edit_records_at")?,
            status: table.u8(6, "AccountCellData.status")?,
            records,
            enable_sub_account,
            renew_sub_account_price,
        })
    }

    pub fn encode(&self, version: u32) -> Vec<u8> {
        let mut fields = vec![
            self.id.to_vec(),
            molecule::pack_dynvec(&self.account.iter().map(AccountChar::encode).collect::<Vec<_>>()),
            molecule::pack_u64(self.registered_at),
            molecule::pack_u64(self.last_transfer_account_at),
            molecule::pack_u64(self.last_edit_manager_at),
            molecule::pack_u64(self.last_edit_records_at),
            molecule::pack_u8(self.status),
            molecule::pack_dynvec(&self.records.iter().map(Record::encode).collect::<Vec<_>>()),
        ];
        if version >= 3 {
            fields.push(molecule::pack_u8(self.enable_sub_account));
            fields.push(molecule::pack_u64(self.renew_sub_account_price));
        }
        molecule::pack_table(&fields)
    }

    /// Full account name: the concatenated characters plus `.bit`.
    pub fn account_name(&self) -> DecodeResult<String> {
        let bytes: Vec<u8> = self
            .account
            .iter()
            .flat_map(|c| c.bytes.iter().copied())
            .collect();
        let chars = String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
            what: "AccountCellData.account",
        })?;
        Ok(format!("{}{}", chars, ACCOUNT_SUFFIX))
    }
}

/// Account cell output data: `hash(32) ++ id(20) ++ next(20) ++ expired_at(8) ++ account`.
pub fn pack_account_cell_output_data(id: &AccountId, expired_at: u64, account: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(EXPIRED_AT_RANGE.end + account.len());
    out.extend_from_slice(&[0u8; 32]);
    out.extend_from_slice(id.as_bytes());
    out.extend_from_slice(&[0u8; 20]);
    out.extend_from_slice(&expired_at.to_le_bytes());
    out.extend_from_slice(account.as_bytes());
    out
}

fn expired_at_from_output_data(tx: &Transaction, index: u32) -> DecodeResult<u64> {
    let data = tx
        .outputs_data
        .get(index as usize)
        .ok_or_else(|| DecodeError::NotFound(format!("output data at index {}", index)))?;
    if data.len() < EXPIRED_AT_RANGE.end {
        return Err(DecodeError::TooShort {
            what: "account cell output data",
            expected: EXPIRED_AT_RANGE.end,
            actual: data.len(),
        });
    }
    molecule::read_u64(&data[EXPIRED_AT_RANGE], "account cell expired_at")
}

/// Account cell state on one side of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCellDataBuilder {
    /// Index of the cell among the inputs (old side) or outputs (new side).
    pub index: u32,
    pub version: u32,
    pub account: String,
    pub account_id: AccountId,
    /// Zero for the old side, where the input's data is not part of this transaction.
    pub expired_at: u64,
    pub status: AccountStatus,
    pub registered_at: u64,
    pub enable_sub_account: u8,
    pub renew_sub_account_price: u64,
    pub records: Vec<Record>,
}

impl AccountCellDataBuilder {
    pub fn from_entity(tx: &Transaction, entity: &DataEntity, side: DataSide) -> DecodeResult<Self> {
        let data = AccountCellData::decode(&entity.entity, entity.version)?;
        let account = data.account_name()?;
        let account_id = account_id_from_name(&account);
        if account_id.0 != data.id {
            return Err(DecodeError::AccountIdMismatch {
                account,
                witness_id: hex::encode(data.id),
                derived_id: hex::encode(account_id.0),
            });
        }

        let expired_at = match side {
            DataSide::New => expired_at_from_output_data(tx, entity.index)?,
            DataSide::Old | DataSide::Dep => 0,
        };

        tracing::trace!(
            account = %account,
            index = entity.index,
            version = entity.version,
            side = ?side,
            "decoded account cell"
        );

        Ok(Self {
            index: entity.index,
            version: entity.version,
            account,
            account_id,
            expired_at,
            status: AccountStatus(data.status),
            registered_at: data.registered_at,
            enable_sub_account: data.enable_sub_account,
            renew_sub_account_price: data.renew_sub_account_price,
            records: data.records,
        })
    }

    /// First account cell on `side`.
    pub fn from_tx(tx: &Transaction, side: DataSide) -> DecodeResult<Self> {
        let entities = entities_from_tx(tx, DataType::ACCOUNT_CELL, side)?;
        let entity = entities.first().ok_or_else(|| {
            DecodeError::NotFound(format!("account cell witness on {:?} side", side))
        })?;
        Self::from_entity(tx, entity, side)
    }

    /// Every account cell on `side`, keyed by cell index.
    pub fn map_from_tx(tx: &Transaction, side: DataSide) -> DecodeResult<HashMap<u32, Self>> {
        entities_from_tx(tx, DataType::ACCOUNT_CELL, side)?
            .iter()
            .map(|entity| Self::from_entity(tx, entity, side).map(|b| (b.index, b)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::witness::{encode_das_witness, Data};

    fn alice() -> AccountCellData {
        let mut data = AccountCellData::new("alice.bit");
        data.registered_at = 1_600_000_000;
        data.status = 0;
        data.enable_sub_account = 1;
        data.records = vec![Record {
            record_type: "address".into(),
            key: "60".into(),
            label: "main".into(),
            value: "0xabc".into(),
            ttl: 300,
        }];
        data
    }

    fn tx_with(data: Data, outputs_data: Vec<Vec<u8>>) -> Transaction {
        Transaction {
            outputs_data,
            witnesses: vec![vec![0; 65], encode_das_witness(DataType::ACCOUNT_CELL, &data.encode())],
            ..Default::default()
        }
    }

    fn entity(data: &AccountCellData, version: u32, index: u32) -> DataEntity {
        DataEntity {
            version,
            index,
            entity: data.encode(version),
        }
    }

    #[test]
    fn test_decode_known_fields() {
        let data = alice();
        let decoded = AccountCellData::decode(&data.encode(3), 3).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(decoded.account_name().unwrap(), "alice.bit");
        assert_eq!(decoded.records[0].ttl, 300);
    }

    #[test]
    fn test_version_2_has_no_sub_account_fields() {
        let data = alice();
        let decoded = AccountCellData::decode(&data.encode(2), 2).unwrap();
        assert_eq!(decoded.enable_sub_account, 0);
        assert_eq!(decoded.records, data.records);
        // a v2 payload is missing fields for v3
        assert!(matches!(
            AccountCellData::decode(&data.encode(2), 3),
            Err(DecodeError::FieldCountMismatch { .. })
        ));
        assert!(matches!(
            AccountCellData::decode(&data.encode(3), 7),
            Err(DecodeError::UnsupportedVersion { version: 7, .. })
        ));
    }

    #[test]
    fn test_builder_new_side_reads_expiration() {
        let data = alice();
        let id = account_id_from_name("alice.bit");
        let tx = tx_with(
            Data {
                old: Some(entity(&data, 3, 0)),
                new: Some(entity(&data, 3, 1)),
                dep: None,
            },
            vec![vec![], pack_account_cell_output_data(&id, 1_700_000_000, "alice.bit")],
        );

        let new = AccountCellDataBuilder::from_tx(&tx, DataSide::New).unwrap();
        assert_eq!(new.index, 1);
        assert_eq!(new.account, "alice.bit");
        assert_eq!(new.account_id, id);
        assert_eq!(new.expired_at, 1_700_000_000);
        assert_eq!(new.enable_sub_account, 1);

        let old = AccountCellDataBuilder::from_tx(&tx, DataSide::Old).unwrap();
        assert_eq!(old.index, 0);
        assert_eq!(old.expired_at, 0);
    }

    #[test]
    fn test_builder_rejects_id_mismatch() {
        let mut data = alice();
        data.id = [7; 20];
        let tx = tx_with(
            Data {
                old: Some(entity(&data, 3, 0)),
                new: None,
                dep: None,
            },
            vec![],
        );
        assert!(matches!(
            AccountCellDataBuilder::from_tx(&tx, DataSide::Old),
            Err(DecodeError::AccountIdMismatch { .. })
        ));
    }

    #[test]
    fn test_builder_missing_side_or_output_data() {
        let data = alice();
        let tx = tx_with(
            Data {
                old: None,
                new: Some(entity(&data, 3, 0)),
                dep: None,
            },
            vec![vec![0; 10]],
        );
        assert!(matches!(
            AccountCellDataBuilder::from_tx(&tx, DataSide::Old),
            Err(DecodeError::NotFound(_))
        ));
        assert!(matches!(
            AccountCellDataBuilder::from_tx(&tx, DataSide::New),
            Err(DecodeError::TooShort { .. })
        ));
    }

    #[test]
    fn test_builder_map_keys_by_index() {
        let alice = alice();
        let bob = AccountCellData::new("bob.bit");
        let tx = Transaction {
            witnesses: vec![
                encode_das_witness(
                    DataType::ACCOUNT_CELL,
                    &Data {
                        old: Some(entity(&alice, 3, 0)),
                        new: None,
                        dep: None,
                    }
                    .encode(),
                ),
                encode_das_witness(
                    DataType::ACCOUNT_CELL,
                    &Data {
                        old: Some(entity(&bob, 2, 1)),
                        new: None,
                        dep: None,
                    }
                    .encode(),
                ),
            ],
            ..Default::default()
        };
        let map = AccountCellDataBuilder::map_from_tx(&tx, DataSide::Old).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1].account, "bob.bit");
        assert_eq!(map[&0].account, "alice.bit");
    }
}
