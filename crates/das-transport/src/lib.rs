//! Chain node transport.
//!
//! - [`rpc`]: blocking JSON-RPC client with retry and backoff
//! - [`network`]: default endpoints and network inference

pub mod network;
pub mod rpc;

pub use network::{default_rpc_endpoint, infer_network_from_url, resolve_rpc_endpoint};
pub use rpc::{CkbRpcClient, TransactionWithStatus, TxStatus};
