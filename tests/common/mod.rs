//! Shared stubs for integration testing.
//!
//! The stubs count every call with atomics so tests can assert not only on
//! responses but on which collaborators were reached at all.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use neo_gateway::chain::backend::ChainBackend;
use neo_gateway::chain::types::{
    Balances, BlockRef, ChainError, ChainResult, InvocationResult, RawTransaction,
    SignedTransaction,
};
use neo_gateway::chain::wallet::{FeeEstimate, WalletAccount, WalletProvider, WalletResult};
use neo_gateway::chain::{Network, NetworkDirectory, NetworkServices};
use neo_gateway::monitor::TransactionMonitor;
use neo_gateway::security::RateLimiter;
use neo_gateway::tools::Dispatcher;

/// A syntactically valid mainnet-format address.
pub const ADDRESS: &str = "NXV7ZhHiyM1aHXwvUNBLNAkCwZ6wgeKyMZ";

/// Txid every stub relay reports.
pub const STUB_TXID: &str =
    "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

/// In-memory chain backend with canned answers and call counters.
pub struct StubBackend {
    pub balances: Balances,
    pub block_count: u64,
    pub invoke_state: &'static str,
    pub calls: AtomicU32,
}

impl Default for StubBackend {
    fn default() -> Self {
        let mut balances = Balances::new();
        balances.insert("NEO".to_string(), "10".to_string());
        balances.insert("GAS".to_string(), "5.5".to_string());
        Self {
            balances,
            block_count: 4_200_000,
            invoke_state: "HALT",
            calls: AtomicU32::new(0),
        }
    }
}

impl StubBackend {
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainBackend for StubBackend {
    async fn get_block_count(&self) -> ChainResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.block_count)
    }

    async fn get_block(&self, block: &BlockRef) -> ChainResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match block {
            BlockRef::Height(h) => Ok(json!({"index": h, "tx": []})),
            BlockRef::Hash(hash) => Ok(json!({"hash": format!("0x{hash}"), "tx": []})),
        }
    }

    async fn get_transaction(&self, txid: &str) -> ChainResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if txid == STUB_TXID {
            Ok(json!({"hash": format!("0x{txid}"), "sender": ADDRESS}))
        } else {
            Err(ChainError::Rpc {
                code: -100,
                message: "Unknown transaction".to_string(),
            })
        }
    }

    async fn get_raw_transaction_with_confirmations(
        &self,
        txid: &str,
    ) -> ChainResult<Option<RawTransaction>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if txid == STUB_TXID {
            Ok(Some(RawTransaction {
                confirmations: 1,
                block_height: Some(self.block_count),
                block_time: Some(1_700_000_000_000),
                payload: json!({"hash": format!("0x{txid}")}),
            }))
        } else {
            Ok(None)
        }
    }

    async fn get_balance(&self, _address: &str) -> ChainResult<Balances> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.balances.clone())
    }

    async fn invoke_script(
        &self,
        _script: &str,
        _signers: &[Value],
    ) -> ChainResult<InvocationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.invocation())
    }

    async fn invoke_function(
        &self,
        _script_hash: &str,
        _operation: &str,
        _args: &[Value],
    ) -> ChainResult<InvocationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.invocation())
    }

    async fn send_raw_transaction(&self, _signed_tx: &str) -> ChainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(STUB_TXID.to_string())
    }
}

impl StubBackend {
    fn invocation(&self) -> InvocationResult {
        InvocationResult {
            state: self.invoke_state.to_string(),
            gas_consumed: "0.0103".to_string(),
            stack: json!([]),
            exception: if self.invoke_state == "FAULT" {
                Some("assert failed".to_string())
            } else {
                None
            },
        }
    }
}

/// Wallet provider returning fixed accounts and signed payloads.
pub struct StubWallet {
    pub build_calls: AtomicU32,
}

impl Default for StubWallet {
    fn default() -> Self {
        Self {
            build_calls: AtomicU32::new(0),
        }
    }
}

impl StubWallet {
    pub fn build_count(&self) -> u32 {
        self.build_calls.load(Ordering::SeqCst)
    }

    fn signed(&self) -> SignedTransaction {
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        SignedTransaction {
            txid: STUB_TXID.to_string(),
            raw: "c2lnbmVkLXR4".to_string(),
        }
    }
}

#[async_trait]
impl WalletProvider for StubWallet {
    fn create_account(&self, _password: &str) -> WalletResult<WalletAccount> {
        Ok(WalletAccount {
            address: ADDRESS.to_string(),
            public_key: "02".repeat(33),
            encrypted_key: "6PYStubEncryptedKeyMaterial".to_string(),
        })
    }

    fn import_account(&self, _key: &str, _password: Option<&str>) -> WalletResult<WalletAccount> {
        Ok(WalletAccount {
            address: ADDRESS.to_string(),
            public_key: "02".repeat(33),
            encrypted_key: "6PYStubEncryptedKeyMaterial".to_string(),
        })
    }

    fn validate_wif(&self, wif: &str) -> bool {
        !wif.is_empty()
    }

    async fn build_transfer(
        &self,
        _from_wif: &str,
        _to_address: &str,
        _asset: &str,
        _amount: &str,
    ) -> WalletResult<SignedTransaction> {
        Ok(self.signed())
    }

    async fn build_contract_call(
        &self,
        _from_wif: &str,
        _script_hash: &str,
        _operation: &str,
        _args: &[Value],
    ) -> WalletResult<SignedTransaction> {
        Ok(self.signed())
    }

    async fn build_gas_claim(&self, _from_wif: &str) -> WalletResult<SignedTransaction> {
        Ok(self.signed())
    }

    async fn estimate_transfer(
        &self,
        _from_address: &str,
        _to_address: &str,
        _asset: &str,
        _amount: &str,
    ) -> WalletResult<FeeEstimate> {
        Ok(FeeEstimate {
            network_fee: "0.0012".to_string(),
            system_fee: "0.0991".to_string(),
            total: "0.1003".to_string(),
        })
    }
}

/// Directory with the stubs bound to the testnet namespace only.
pub fn test_directory(
    backend: Option<Arc<StubBackend>>,
    wallet: Option<Arc<StubWallet>>,
) -> Arc<NetworkDirectory> {
    let mut directory = NetworkDirectory::new(Network::Testnet);
    directory.bind(
        Network::Testnet,
        NetworkServices {
            backend: backend.map(|b| b as Arc<dyn ChainBackend>),
            wallet: wallet.map(|w| w as Arc<dyn WalletProvider>),
        },
    );
    Arc::new(directory)
}

/// Fully wired dispatcher over the stubs with a permissive rate limit.
pub fn test_dispatcher(
    backend: Option<Arc<StubBackend>>,
    wallet: Option<Arc<StubWallet>>,
    max_requests: u32,
) -> Dispatcher {
    let directory = test_directory(backend, wallet);
    let monitor = Arc::new(TransactionMonitor::new(
        Arc::clone(&directory),
        Duration::from_secs(15),
        Duration::from_secs(3600),
        Duration::from_secs(86_400),
    ));
    let limiter = Arc::new(RateLimiter::new(max_requests, 60_000, true));
    Dispatcher::new(directory, limiter, monitor)
}
