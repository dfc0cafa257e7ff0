//! Blocking JSON-RPC client for a chain node.
//!
//! ```ignore
//! let client = CkbRpcClient::mainnet();
//! let tip = client.get_tip_block_number()?;
//! let tx = client.get_transaction(&hash)?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use das_types::serde_hex;
use das_types::{env_var_or, Header, RetryConfig, TransactionView, H256};

use crate::network::{MAINNET_RPC, TESTNET_RPC};

/// Status of a transaction as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TxStatus {
    pub status: String,
    #[serde(default)]
    pub block_hash: Option<H256>,
}

/// Result of `get_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionWithStatus {
    pub transaction: Option<TransactionView>,
    pub tx_status: TxStatus,
}

#[derive(Deserialize)]
struct TipHeader {
    #[serde(with = "serde_hex::u64_hex")]
    number: u64,
}

/// Whether a failed call is worth repeating.
#[derive(Debug)]
enum CallError {
    Transient(anyhow::Error),
    Fatal(anyhow::Error),
}

pub struct CkbRpcClient {
    endpoint: String,
    agent: ureq::Agent,
    retry: RetryConfig,
    next_id: AtomicU64,
}

impl Clone for CkbRpcClient {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            agent: self.agent.clone(),
            retry: self.retry,
            next_id: AtomicU64::new(self.next_id.load(Ordering::Relaxed)),
        }
    }
}

impl CkbRpcClient {
    /// Default request timeout in seconds (can be overridden by env).
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    fn default_timeouts() -> (Duration, Duration) {
        (
            Duration::from_secs(env_var_or("DAS_RPC_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)),
            Duration::from_secs(env_var_or(
                "DAS_RPC_CONNECT_TIMEOUT_SECS",
                Self::DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
        )
    }

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    pub fn mainnet() -> Self {
        Self::new(MAINNET_RPC)
    }

    pub fn testnet() -> Self {
        Self::new(TESTNET_RPC)
    }

    pub fn new(endpoint: &str) -> Self {
        let (timeout, connect_timeout) = Self::default_timeouts();
        Self::with_timeouts(endpoint, timeout, connect_timeout)
    }

    pub fn with_timeouts(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: Self::build_agent(timeout, connect_timeout),
            retry: RetryConfig::default(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn call_once(&self, method: &str, params: &Value) -> std::result::Result<Value, CallError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response = match self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&body)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) if code >= 500 || code == 429 => {
                return Err(CallError::Transient(anyhow!(
                    "{} returned HTTP {}",
                    method,
                    code
                )))
            }
            Err(ureq::Error::Status(code, _)) => {
                return Err(CallError::Fatal(anyhow!("{} returned HTTP {}", method, code)))
            }
            Err(e) => {
                return Err(CallError::Transient(anyhow!("{} request failed: {}", method, e)))
            }
        };

        let value: Value = response
            .into_json()
            .map_err(|e| CallError::Transient(anyhow!("Failed to read {} response: {}", method, e)))?;
        parse_rpc_response(value).map_err(CallError::Fatal)
    }

    /// Call `method`, retrying transport failures with backoff.
    pub fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let mut attempt = 0;
        loop {
            match self.call_once(method, &params) {
                Ok(result) => {
                    return serde_json::from_value(result)
                        .with_context(|| format!("Failed to decode {} result", method))
                }
                Err(CallError::Transient(e)) if attempt < self.retry.retries => {
                    let backoff = self.retry.backoff(attempt);
                    tracing::warn!(
                        method,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "rpc call failed, retrying"
                    );
                    std::thread::sleep(backoff);
                    attempt += 1;
                }
                Err(CallError::Transient(e)) | Err(CallError::Fatal(e)) => return Err(e),
            }
        }
    }

    /// Fetch a transaction with its status. `None` if the node does not know it.
    pub fn get_transaction(&self, hash: &H256) -> Result<Option<TransactionWithStatus>> {
        let result: Option<TransactionWithStatus> =
            self.call("get_transaction", serde_json::json!([hash]))?;
        Ok(result.filter(|r| r.transaction.is_some()))
    }

    pub fn get_header(&self, block_hash: &H256) -> Result<Option<Header>> {
        self.call("get_header", serde_json::json!([block_hash]))
    }

    pub fn get_header_by_number(&self, number: u64) -> Result<Option<Header>> {
        self.call(
            "get_header_by_number",
            serde_json::json!([format!("{:#x}", number)]),
        )
    }

    pub fn get_tip_block_number(&self) -> Result<u64> {
        let tip: TipHeader = self.call("get_tip_header", serde_json::json!([]))?;
        Ok(tip.number)
    }
}

/// Extract `result` from a JSON-RPC response envelope.
pub fn parse_rpc_response(response: Value) -> Result<Value> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(anyhow!("RPC error {}: {}", code, message));
    }
    response
        .get("result")
        .cloned()
        .ok_or_else(|| anyhow!("No result in RPC response"))
}
