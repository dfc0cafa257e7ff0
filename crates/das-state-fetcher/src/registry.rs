//! Registry of the contract versions the indexer accepts.
//!
//! Each contract is identified on chain by its type id, the code hash a cell's
//! type script references. Cells produced under a superseded contract carry a
//! different code hash and are not recognized.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use das_types::{DasContractName, H256};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NotRegistered(DasContractName),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::NotRegistered(name) => write!(f, "contract {} is not registered", name),
        }
    }
}

impl std::error::Error for RegistryError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub name: DasContractName,
    pub type_id: H256,
}

impl ContractInfo {
    pub fn is_same_type_id(&self, code_hash: &H256) -> bool {
        self.type_id == *code_hash
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    contracts: HashMap<DasContractName, ContractInfo>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: DasContractName, type_id: H256) {
        self.contracts.insert(name, ContractInfo { name, type_id });
    }

    pub fn with_contract(mut self, name: DasContractName, type_id: H256) -> Self {
        self.register(name, type_id);
        self
    }

    /// Build from `name -> type id hex` pairs, as found in config files.
    pub fn from_type_ids(type_ids: &BTreeMap<DasContractName, String>) -> Result<Self> {
        let mut registry = Self::new();
        for (name, type_id) in type_ids {
            let type_id: H256 = type_id
                .parse()
                .with_context(|| format!("Invalid type id for contract {}", name))?;
            registry.register(*name, type_id);
        }
        Ok(registry)
    }

    pub fn get_das_contract_info(&self, name: DasContractName) -> Result<&ContractInfo, RegistryError> {
        self.contracts
            .get(&name)
            .ok_or(RegistryError::NotRegistered(name))
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
