//! Indexer configuration.
//!
//! Precedence, highest first: CLI flags, `DAS_*` environment variables, the
//! optional JSON config file, built-in defaults.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use das_state_fetcher::ContractRegistry;
use das_transport::{default_rpc_endpoint, infer_network_from_url};
use das_types::{env_var, DasContractName, RetryConfig};

pub const DEFAULT_NETWORK: &str = "mainnet";
pub const DEFAULT_PARSER_CONCURRENCY: usize = 4;
pub const DEFAULT_TX_CACHE_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Chain node endpoint; empty means the default for `network`.
    pub rpc_url: String,
    pub network: String,
    /// Transactions handled at once by `BlockParser::handle_many`.
    pub parser_concurrency: usize,
    pub tx_cache_capacity: usize,
    pub retry: RetryConfig,
    /// Contract name to type id (hex).
    pub contracts: BTreeMap<DasContractName, String>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            network: DEFAULT_NETWORK.to_string(),
            parser_concurrency: DEFAULT_PARSER_CONCURRENCY,
            tx_cache_capacity: DEFAULT_TX_CACHE_CAPACITY,
            retry: RetryConfig::default(),
            contracts: BTreeMap::new(),
        }
    }
}

impl IndexerConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    /// Overlay `DAS_*` environment variables.
    pub fn apply_env(&mut self) {
        if let Some(url) = env_var::<String>("DAS_RPC_URL") {
            self.rpc_url = url;
        }
        if let Some(network) = env_var::<String>("DAS_NETWORK") {
            self.network = network;
        }
        if let Some(n) = env_var::<usize>("DAS_PARSER_CONCURRENCY") {
            self.parser_concurrency = n;
        }
        if let Some(n) = env_var::<usize>("DAS_TX_CACHE_CAPACITY") {
            self.tx_cache_capacity = n;
        }
        for name in DasContractName::ALL {
            if let Some(type_id) = env_var::<String>(&contract_env_key(name)) {
                self.contracts.insert(name, type_id);
            }
        }
    }

    /// The endpoint to query, falling back to the network default.
    pub fn rpc_endpoint(&self) -> String {
        if self.rpc_url.is_empty() {
            default_rpc_endpoint(&self.network)
        } else {
            self.rpc_url.clone()
        }
    }

    /// Network name, inferred from the endpoint when it names one.
    pub fn effective_network(&self) -> String {
        infer_network_from_url(&self.rpc_url)
            .map(str::to_string)
            .unwrap_or_else(|| self.network.clone())
    }

    pub fn registry(&self) -> Result<ContractRegistry> {
        ContractRegistry::from_type_ids(&self.contracts).context("build contract registry")
    }
}

/// `DAS_CONTRACT_ACCOUNT_CELL_TYPE` for `account-cell-type`.
pub fn contract_env_key(name: DasContractName) -> String {
    format!(
        "DAS_CONTRACT_{}",
        name.as_str().replace('-', "_").to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = IndexerConfig::default();
        assert_eq!(config.network, "mainnet");
        assert_eq!(config.parser_concurrency, DEFAULT_PARSER_CONCURRENCY);
        assert!(config.contracts.is_empty());
        assert_eq!(config.rpc_endpoint(), default_rpc_endpoint("mainnet"));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "network": "testnet",
                "parser_concurrency": 8,
                "contracts": {{ "account-cell-type": "0x{}" }}
            }}"#,
            "11".repeat(32)
        )
        .unwrap();

        let config = IndexerConfig::load(file.path()).unwrap();
        assert_eq!(config.network, "testnet");
        assert_eq!(config.parser_concurrency, 8);
        assert_eq!(config.tx_cache_capacity, DEFAULT_TX_CACHE_CAPACITY);
        assert_eq!(config.retry, RetryConfig::default());

        let registry = config.registry().unwrap();
        assert!(registry
            .get_das_contract_info(DasContractName::AccountCellType)
            .is_ok());
        assert!(registry
            .get_das_contract_info(DasContractName::IncomeCellType)
            .is_err());
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = IndexerConfig::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("parse config"));
    }

    #[test]
    fn test_contract_env_key() {
        assert_eq!(
            contract_env_key(DasContractName::IncomeCellType),
            "DAS_CONTRACT_INCOME_CELL_TYPE"
        );
        assert_eq!(contract_env_key(DasContractName::DasLock), "DAS_CONTRACT_DAS_LOCK");
    }

    #[test]
    fn test_apply_env_contract_override() {
        let key = contract_env_key(DasContractName::ConfigCellType);
        std::env::set_var(&key, format!("0x{}", "22".repeat(32)));
        let mut config = IndexerConfig::default();
        config.apply_env();
        std::env::remove_var(&key);
        assert_eq!(
            config.contracts.get(&DasContractName::ConfigCellType),
            Some(&format!("0x{}", "22".repeat(32)))
        );
    }
}
