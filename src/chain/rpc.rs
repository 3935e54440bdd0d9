//! Default JSON-RPC 2.0 binding of [`ChainBackend`].
//!
//! # Responsibilities
//! - Speak the N3 node RPC surface the gateway consumes
//! - Enforce a per-request timeout
//! - Map transport and node failures onto [`ChainError`] for the normalizer
//!
//! The gateway core never depends on this type directly; it exists so the
//! shipped binary can serve the read-only catalog from configuration alone.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::backend::ChainBackend;
use crate::chain::types::{
    Balances, BlockRef, ChainError, ChainResult, InvocationResult, RawTransaction,
};

/// Native NEO token script hash (no prefix) and its decimal count.
const NEO_ASSET: (&str, u32) = ("ef4073a0f2b305a38ec4050e4d3d28bc40ea63f5", 0);
/// Native GAS token script hash (no prefix) and its decimal count.
const GAS_ASSET: (&str, u32) = ("d2a4cff31913016155e38e474a2c06d08be276cf", 8);

/// JSON-RPC client for one N3 node endpoint.
pub struct JsonRpcBackend {
    client: reqwest::Client,
    endpoint: url::Url,
    timeout_duration: Duration,
}

impl JsonRpcBackend {
    /// Create a backend for `endpoint` with the given request timeout.
    pub fn new(endpoint: &str, timeout_secs: u64) -> ChainResult<Self> {
        let endpoint: url::Url = endpoint
            .parse()
            .map_err(|e| ChainError::Other(format!("Invalid RPC URL '{endpoint}': {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            timeout_duration: Duration::from_secs(timeout_secs),
        })
    }

    async fn call(&self, method: &str, params: Value) -> ChainResult<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let fut = self.client.post(self.endpoint.clone()).json(&body).send();
        let response = match timeout(self.timeout_duration, fut).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_connect() => return Err(ChainError::ConnectionRefused),
            Ok(Err(e)) if e.is_timeout() => {
                return Err(ChainError::Timeout(self.timeout_duration.as_secs()))
            }
            Ok(Err(e)) => return Err(ChainError::Other(e.to_string())),
            Err(_) => return Err(ChainError::Timeout(self.timeout_duration.as_secs())),
        };

        let payload: Value = response
            .json()
            .await
            .map_err(|e| ChainError::Other(format!("Malformed RPC response: {e}")))?;

        if let Some(error) = payload.get("error") {
            return Err(ChainError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown RPC error")
                    .to_string(),
            });
        }

        payload
            .get("result")
            .cloned()
            .ok_or_else(|| ChainError::Other("RPC response missing result".to_string()))
    }
}

fn parse_invocation(result: &Value) -> InvocationResult {
    InvocationResult {
        state: result
            .get("state")
            .and_then(Value::as_str)
            .unwrap_or("NONE")
            .to_string(),
        gas_consumed: result
            .get("gasconsumed")
            .and_then(Value::as_str)
            .unwrap_or("0")
            .to_string(),
        stack: result.get("stack").cloned().unwrap_or(Value::Null),
        exception: result
            .get("exception")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Render a raw integer amount as a decimal string with `decimals` places.
fn format_units(raw: &str, decimals: u32) -> String {
    if decimals == 0 {
        return raw.to_string();
    }
    let width = decimals as usize;
    let padded = format!("{raw:0>width$}", width = width + 1);
    let split = padded.len() - width;
    let (whole, frac) = padded.split_at(split);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

#[async_trait]
impl ChainBackend for JsonRpcBackend {
    async fn get_block_count(&self) -> ChainResult<u64> {
        let result = self.call("getblockcount", json!([])).await?;
        result
            .as_u64()
            .ok_or_else(|| ChainError::Other("getblockcount returned a non-integer".to_string()))
    }

    async fn get_block(&self, block: &BlockRef) -> ChainResult<Value> {
        let id = match block {
            BlockRef::Hash(hash) => json!(format!("0x{hash}")),
            BlockRef::Height(height) => json!(height),
        };
        self.call("getblock", json!([id, 1])).await
    }

    async fn get_transaction(&self, txid: &str) -> ChainResult<Value> {
        self.call("getrawtransaction", json!([format!("0x{txid}"), 1]))
            .await
    }

    async fn get_raw_transaction_with_confirmations(
        &self,
        txid: &str,
    ) -> ChainResult<Option<RawTransaction>> {
        let result = self
            .call("getrawtransaction", json!([format!("0x{txid}"), 1]))
            .await;
        let payload = match result {
            Ok(payload) => payload,
            // "Unknown transaction" is a normal answer for the monitor.
            Err(ChainError::Rpc { message, .. })
                if message.to_lowercase().contains("unknown transaction") =>
            {
                return Ok(None)
            }
            Err(e) => return Err(e),
        };

        let confirmations = payload
            .get("confirmations")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;
        Ok(Some(RawTransaction {
            confirmations,
            block_height: payload.get("blockindex").and_then(Value::as_u64),
            // N3 block timestamps are already epoch milliseconds.
            block_time: payload.get("blocktime").and_then(Value::as_u64),
            payload,
        }))
    }

    async fn get_balance(&self, address: &str) -> ChainResult<Balances> {
        let result = self.call("getnep17balances", json!([address])).await?;
        let mut balances = Balances::new();
        let entries = result
            .get("balance")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for entry in entries {
            let asset_hash = entry
                .get("assethash")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim_start_matches("0x")
                .to_lowercase();
            let raw = entry
                .get("amount")
                .and_then(Value::as_str)
                .unwrap_or("0")
                .to_string();
            let (symbol, amount) = if asset_hash == NEO_ASSET.0 {
                ("NEO".to_string(), format_units(&raw, NEO_ASSET.1))
            } else if asset_hash == GAS_ASSET.0 {
                ("GAS".to_string(), format_units(&raw, GAS_ASSET.1))
            } else {
                (format!("0x{asset_hash}"), raw)
            };
            balances.insert(symbol, amount);
        }
        Ok(balances)
    }

    async fn invoke_script(&self, script: &str, signers: &[Value]) -> ChainResult<InvocationResult> {
        let result = self.call("invokescript", json!([script, signers])).await?;
        Ok(parse_invocation(&result))
    }

    async fn invoke_function(
        &self,
        script_hash: &str,
        operation: &str,
        args: &[Value],
    ) -> ChainResult<InvocationResult> {
        let result = self
            .call(
                "invokefunction",
                json!([format!("0x{script_hash}"), operation, args]),
            )
            .await?;
        Ok(parse_invocation(&result))
    }

    async fn send_raw_transaction(&self, signed_tx: &str) -> ChainResult<String> {
        let result = self.call("sendrawtransaction", json!([signed_tx])).await?;
        result
            .get("hash")
            .and_then(Value::as_str)
            .map(|hash| hash.trim_start_matches("0x").to_string())
            .ok_or_else(|| ChainError::Other("sendrawtransaction returned no hash".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units("10", 0), "10");
        assert_eq!(format_units("550000000", 8), "5.5");
        assert_eq!(format_units("100000000", 8), "1");
        assert_eq!(format_units("1", 8), "0.00000001");
        assert_eq!(format_units("0", 8), "0");
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(JsonRpcBackend::new("not a url", 10).is_err());
        assert!(JsonRpcBackend::new("https://rpc.example.org:10332", 10).is_ok());
    }
}
