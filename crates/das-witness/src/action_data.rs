//! The action witness that names what a transaction does.

use das_types::Transaction;

use crate::error::DecodeResult;
use crate::molecule::{self, Table};
use crate::witness::{witness_payload, DataType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionData {
    pub action: String,
    pub params: Vec<u8>,
}

impl ActionData {
    pub fn new(action: impl Into<String>, params: Vec<u8>) -> Self {
        Self {
            action: action.into(),
            params,
        }
    }

    pub fn decode(slice: &[u8]) -> DecodeResult<Self> {
        let table = Table::parse(slice, "ActionData", 2)?;
        Ok(Self {
            action: table.string(0, "ActionData.action")?,
            params: table.bytes(1, "ActionData.params")?.to_vec(),
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        molecule::pack_table(&[
            molecule::pack_bytes(self.action.as_bytes()),
            molecule::pack_bytes(&self.params),
        ])
    }

    pub fn from_tx(tx: &Transaction) -> DecodeResult<Self> {
        Self::decode(witness_payload(tx, DataType::ACTION_DATA)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::witness::encode_das_witness;

    #[test]
    fn test_from_tx() {
        let action = ActionData::new("edit_manager", vec![0x00]);
        let tx = Transaction {
            witnesses: vec![
                vec![0; 65],
                encode_das_witness(DataType::ACTION_DATA, &action.encode()),
            ],
            ..Default::default()
        };
        assert_eq!(ActionData::from_tx(&tx).unwrap(), action);
    }

    #[test]
    fn test_missing_action_witness() {
        let tx = Transaction {
            witnesses: vec![vec![0; 65]],
            ..Default::default()
        };
        assert!(matches!(ActionData::from_tx(&tx), Err(DecodeError::NotFound(_))));
    }
}
