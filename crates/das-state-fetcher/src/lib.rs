//! Chain state access for the das-indexer.
//!
//! This crate provides:
//! - [`client`]: the [`ChainClient`] query trait, implemented for the RPC client
//! - [`memory`]: an in-memory [`MemoryChain`] for tests and offline runs
//! - [`registry`]: the accepted contract versions, by type id
//! - [`version`]: the version guard applied before a transaction is parsed
//! - [`lookup`]: historical lookup of the outputs an input consumes
//! - [`cache`]: the bounded transaction cache behind lookups

pub mod cache;
pub mod client;
pub mod lookup;
pub mod memory;
pub mod registry;
pub mod version;

pub use cache::TransactionCache;
pub use client::{ChainClient, FetchedTransaction};
pub use lookup::{HistoricalStateProvider, LookupError};
pub use memory::MemoryChain;
pub use registry::{ContractInfo, ContractRegistry, RegistryError};
pub use version::is_current_version_tx;
