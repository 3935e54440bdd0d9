//! Wallet/crypto provider capability.
//!
//! Key material never enters the gateway core: account creation, WIF
//! handling, encryption, and transaction signing are all consumed through
//! this trait. The gateway ships no binding; embedders inject one per
//! network namespace, and its absence is reported as a configuration error
//! on the affected calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::chain::types::SignedTransaction;

/// Failures surfaced by a wallet provider.
#[derive(Debug, Error)]
pub enum WalletError {
    /// WIF or private key did not parse.
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// Password could not decrypt the key material.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Signing failed.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Transaction could not be assembled (bad asset, script build failure).
    #[error("{0}")]
    Build(String),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// A created or imported account, safe to return to callers.
///
/// The encrypted key is NEP-2 material; the plaintext key never appears
/// here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: String,
    pub public_key: String,
    pub encrypted_key: String,
}

/// Fee breakdown for a prospective transfer, decimal GAS strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub network_fee: String,
    pub system_fee: String,
    pub total: String,
}

/// Key handling and transaction assembly for one network namespace.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Generate a fresh account, encrypting its key with `password`.
    fn create_account(&self, password: &str) -> WalletResult<WalletAccount>;

    /// Import an account from a WIF or hex private key, optionally
    /// encrypting it with `password`.
    fn import_account(&self, key: &str, password: Option<&str>) -> WalletResult<WalletAccount>;

    /// Shape-check a WIF without deriving anything from it.
    fn validate_wif(&self, wif: &str) -> bool;

    /// Build and sign an asset transfer.
    async fn build_transfer(
        &self,
        from_wif: &str,
        to_address: &str,
        asset: &str,
        amount: &str,
    ) -> WalletResult<SignedTransaction>;

    /// Build and sign a contract invocation.
    async fn build_contract_call(
        &self,
        from_wif: &str,
        script_hash: &str,
        operation: &str,
        args: &[Value],
    ) -> WalletResult<SignedTransaction>;

    /// Build and sign a GAS claim for the key's address.
    async fn build_gas_claim(&self, from_wif: &str) -> WalletResult<SignedTransaction>;

    /// Assemble an unsigned transfer and report its fees without relaying
    /// anything.
    async fn estimate_transfer(
        &self,
        from_address: &str,
        to_address: &str,
        asset: &str,
        amount: &str,
    ) -> WalletResult<FeeEstimate>;
}

impl From<WalletError> for crate::errors::GatewayError {
    fn from(err: WalletError) -> Self {
        use crate::errors::GatewayError;
        match err {
            WalletError::InvalidKey(_) | WalletError::Decryption(_) => {
                GatewayError::Validation(err.to_string())
            }
            WalletError::Signing(_) | WalletError::Build(_) => {
                GatewayError::Transaction(err.to_string())
            }
        }
    }
}
