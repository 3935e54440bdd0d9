//! Chain-facing types and the raw backend failure taxonomy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Raw failures surfaced by a [`ChainBackend`](crate::chain::ChainBackend).
///
/// These are the signals the error normalizer classifies; handlers never
/// pass them to callers directly.
#[derive(Debug, Error)]
pub enum ChainError {
    /// TCP connection refused by the RPC endpoint.
    #[error("connection refused by RPC endpoint")]
    ConnectionRefused,

    /// Request exceeded the configured RPC timeout.
    #[error("RPC request timed out after {0} seconds")]
    Timeout(u64),

    /// DNS resolution failed for the RPC endpoint.
    #[error("RPC host not found")]
    HostNotFound,

    /// Structured JSON-RPC error returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Anything else the transport reported, verbatim.
    #[error("{0}")]
    Other(String),
}

/// Result type for backend operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Block or height reference accepted by `get_block`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRef {
    /// 64-hex block hash, without the `0x` prefix.
    Hash(String),
    /// Block index.
    Height(u64),
}

/// Transaction lookup result including its confirmation depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Blocks built atop the containing block; 0 while in the mempool.
    pub confirmations: u32,
    /// Height of the containing block, once mined.
    pub block_height: Option<u64>,
    /// Block timestamp in epoch milliseconds, once mined.
    pub block_time: Option<u64>,
    /// Node-reported transaction body, passed through to callers.
    pub payload: Value,
}

/// Asset symbol -> amount, amounts kept as decimal strings to preserve
/// precision.
pub type Balances = BTreeMap<String, String>;

/// Signed transaction produced by a wallet provider, ready to relay.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    /// Transaction id, 64 hex chars without prefix.
    pub txid: String,
    /// Base64-encoded signed transaction bytes.
    pub raw: String,
}

/// Script invocation outcome from `invokescript`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResult {
    /// VM halt state, e.g. "HALT" or "FAULT".
    pub state: String,
    /// GAS consumed by the execution, decimal string.
    pub gas_consumed: String,
    /// Result stack as reported by the node.
    pub stack: Value,
    /// Fault message when `state` is "FAULT".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_error_display() {
        let err = ChainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC request timed out after 10 seconds");

        let err = ChainError::Rpc {
            code: -32601,
            message: "Method not found".into(),
        };
        assert!(err.to_string().contains("-32601"));
    }

    #[test]
    fn test_raw_transaction_serde() {
        let tx = RawTransaction {
            confirmations: 3,
            block_height: Some(100),
            block_time: Some(1_700_000_000_000),
            payload: serde_json::json!({"txid": "0xabc"}),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["confirmations"], 3);
        assert_eq!(json["block_height"], 100);
    }
}
