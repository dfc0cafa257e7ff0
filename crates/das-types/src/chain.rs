//! UTXO-style chain model.
//!
//! These types mirror the chain node's JSON-RPC encoding (hex quantities, hex byte
//! strings) so a fetched transaction deserializes directly into them.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::encoding::{bytes_to_hex, hex_to_bytes};
use crate::serde_hex;

/// 32-byte hash (transaction hash, block hash, script code hash).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct H256(pub [u8; 32]);

impl H256 {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for H256 {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex_to_bytes(s)?;
        let array: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| anyhow!("Invalid H256 '{}': expected 32 bytes, got {}", s, bytes.len()))?;
        Ok(H256(array))
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }
}

impl Serialize for H256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptHashType {
    Data,
    #[default]
    Type,
    Data1,
    Data2,
}

/// Lock or type script attached to a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    pub code_hash: H256,
    pub hash_type: ScriptHashType,
    #[serde(with = "serde_hex::bytes")]
    pub args: Vec<u8>,
}

/// Reference to a cell: `(tx_hash, index)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_hash: H256,
    #[serde(with = "serde_hex::u32_hex")]
    pub index: u32,
}

impl OutPoint {
    pub fn new(tx_hash: H256, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tx_hash, self.index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDep {
    pub out_point: OutPoint,
    pub dep_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellInput {
    #[serde(with = "serde_hex::u64_hex")]
    pub since: u64,
    pub previous_output: OutPoint,
}

impl CellInput {
    pub fn new(previous_output: OutPoint) -> Self {
        Self {
            since: 0,
            previous_output,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOutput {
    #[serde(with = "serde_hex::u64_hex")]
    pub capacity: u64,
    pub lock: Script,
    #[serde(rename = "type", default)]
    pub type_: Option<Script>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(with = "serde_hex::u32_hex", default)]
    pub version: u32,
    #[serde(default)]
    pub cell_deps: Vec<CellDep>,
    #[serde(default)]
    pub header_deps: Vec<H256>,
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
    #[serde(with = "serde_hex::bytes_vec", default)]
    pub outputs_data: Vec<Vec<u8>>,
    #[serde(with = "serde_hex::bytes_vec", default)]
    pub witnesses: Vec<Vec<u8>>,
}

impl Transaction {
    /// Sum of all output capacities.
    pub fn outputs_capacity(&self) -> u64 {
        self.outputs
            .iter()
            .fold(0u64, |acc, output| acc.saturating_add(output.capacity))
    }

    /// Lock args of output `index`, if present.
    pub fn output_lock_args(&self, index: usize) -> Option<&[u8]> {
        self.outputs.get(index).map(|o| o.lock.args.as_slice())
    }
}

/// Transaction plus its hash, as returned by `get_transaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub inner: Transaction,
    pub hash: H256,
}

/// Block header fields the indexer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub hash: H256,
    #[serde(with = "serde_hex::u64_hex")]
    pub number: u64,
    /// Milliseconds since the Unix epoch.
    #[serde(with = "serde_hex::u64_hex")]
    pub timestamp: u64,
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Script {{ code_hash: {}, hash_type: {:?}, args: {} }}",
            self.code_hash,
            self.hash_type,
            bytes_to_hex(&self.args)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h256_parse_and_display() {
        let hex = format!("0x{}", "ab".repeat(32));
        let hash: H256 = hex.parse().unwrap();
        assert_eq!(hash.0, [0xab; 32]);
        assert_eq!(hash.to_string(), hex);
        assert!("0x1234".parse::<H256>().is_err());
    }

    #[test]
    fn test_transaction_view_from_rpc_json() {
        let code_hash = format!("0x{}", "01".repeat(32));
        let prev_hash = format!("0x{}", "02".repeat(32));
        let tx_hash = format!("0x{}", "03".repeat(32));
        let json = serde_json::json!({
            "version": "0x0",
            "cell_deps": [],
            "header_deps": [],
            "inputs": [{"since": "0x0", "previous_output": {"tx_hash": prev_hash, "index": "0x1"}}],
            "outputs": [
                {"capacity": "0x64", "lock": {"code_hash": code_hash, "hash_type": "type", "args": "0x0102"}, "type": null},
                {"capacity": "0xc8", "lock": {"code_hash": code_hash, "hash_type": "data1", "args": "0x"},
                 "type": {"code_hash": code_hash, "hash_type": "type", "args": "0x"}}
            ],
            "outputs_data": ["0x", "0xff"],
            "witnesses": ["0x646173"],
            "hash": tx_hash,
        });

        let view: TransactionView = serde_json::from_value(json).unwrap();
        assert_eq!(view.hash.0, [0x03; 32]);
        assert_eq!(view.inner.inputs[0].previous_output.index, 1);
        assert_eq!(view.inner.outputs_capacity(), 300);
        assert_eq!(view.inner.outputs[1].lock.hash_type, ScriptHashType::Data1);
        assert!(view.inner.outputs[0].type_.is_none());
        assert!(view.inner.outputs[1].type_.is_some());
        assert_eq!(view.inner.output_lock_args(0), Some(&[0x01, 0x02][..]));
        assert_eq!(view.inner.witnesses[0], b"das".to_vec());
    }
}
