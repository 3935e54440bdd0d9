//! Chain backend capability.
//!
//! The gateway consumes block, transaction, balance, and relay operations
//! through this trait; everything about the node's wire protocol lives
//! behind it. A default JSON-RPC binding is provided in
//! [`rpc`](crate::chain::rpc); tests substitute in-memory stubs.

use async_trait::async_trait;
use serde_json::Value;

use crate::chain::types::{Balances, BlockRef, ChainResult, InvocationResult, RawTransaction};

/// Read/write operations against one blockchain node.
#[async_trait]
pub trait ChainBackend: Send + Sync {
    /// Current block height of the chain.
    async fn get_block_count(&self) -> ChainResult<u64>;

    /// Fetch a block by hash or height.
    async fn get_block(&self, block: &BlockRef) -> ChainResult<Value>;

    /// Fetch a transaction by id (64 hex chars, no prefix).
    async fn get_transaction(&self, txid: &str) -> ChainResult<Value>;

    /// Fetch a transaction together with its confirmation depth.
    ///
    /// `Ok(None)` means the node does not know the transaction; that is a
    /// normal answer for the confirmation monitor, not an error.
    async fn get_raw_transaction_with_confirmations(
        &self,
        txid: &str,
    ) -> ChainResult<Option<RawTransaction>>;

    /// Asset balances for an address, amounts as decimal strings.
    async fn get_balance(&self, address: &str) -> ChainResult<Balances>;

    /// Execute a script read-only and return the VM result.
    async fn invoke_script(&self, script: &str, signers: &[Value]) -> ChainResult<InvocationResult>;

    /// Invoke a contract method read-only, letting the node assemble the
    /// script. Backs the query path of `invoke_contract`.
    async fn invoke_function(
        &self,
        script_hash: &str,
        operation: &str,
        args: &[Value],
    ) -> ChainResult<InvocationResult>;

    /// Relay a signed transaction; returns the accepted txid.
    async fn send_raw_transaction(&self, signed_tx: &str) -> ChainResult<String>;
}
