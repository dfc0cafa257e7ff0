//! Default node endpoints per network.

use das_types::env_var;

pub const MAINNET_RPC: &str = "https://mainnet.ckb.dev/rpc";
pub const TESTNET_RPC: &str = "https://testnet.ckb.dev/rpc";

pub fn infer_network_from_url(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    if lower.contains("testnet") {
        Some("testnet")
    } else if lower.contains("mainnet") {
        Some("mainnet")
    } else {
        None
    }
}

pub fn default_rpc_endpoint(network: &str) -> String {
    match network {
        "testnet" => TESTNET_RPC.to_string(),
        _ => MAINNET_RPC.to_string(),
    }
}

/// `DAS_RPC_URL` if set, otherwise the default endpoint for `network`.
pub fn resolve_rpc_endpoint(network: &str) -> String {
    env_var("DAS_RPC_URL").unwrap_or_else(|| default_rpc_endpoint(network))
}
