//! Network namespaces and service resolution.
//!
//! # Responsibilities
//! - Parse network strings into the closed [`Network`] set
//! - Bind each namespace to exactly one chain backend and one wallet
//!   provider
//! - Distinguish "malformed network string" (validation error) from
//!   "namespace not configured" (configuration error)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::chain::backend::ChainBackend;
use crate::chain::wallet::WalletProvider;
use crate::errors::{GatewayError, GatewayResult};

/// One independently configured blockchain environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// All namespaces the gateway knows about.
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(GatewayError::Validation(format!(
                "Invalid network '{other}': expected 'mainnet' or 'testnet'"
            ))),
        }
    }
}

/// Service bindings for one namespace.
///
/// Either binding may be absent; resolution reports the gap as a
/// configuration error on the calls that need it.
#[derive(Clone, Default)]
pub struct NetworkServices {
    pub backend: Option<Arc<dyn ChainBackend>>,
    pub wallet: Option<Arc<dyn WalletProvider>>,
}

/// Immutable map from namespace to its bindings, built once at startup.
pub struct NetworkDirectory {
    entries: HashMap<Network, NetworkServices>,
    default_network: Network,
}

impl NetworkDirectory {
    pub fn new(default_network: Network) -> Self {
        Self {
            entries: HashMap::new(),
            default_network,
        }
    }

    /// Bind services for a namespace. Replaces any prior binding.
    pub fn bind(&mut self, network: Network, services: NetworkServices) {
        self.entries.insert(network, services);
    }

    /// The namespace used when a call omits `network`.
    pub fn default_network(&self) -> Network {
        self.default_network
    }

    /// Namespaces that have at least a backend bound.
    pub fn configured(&self) -> Vec<Network> {
        let mut networks: Vec<Network> = Network::ALL
            .into_iter()
            .filter(|n| {
                self.entries
                    .get(n)
                    .is_some_and(|services| services.backend.is_some())
            })
            .collect();
        networks.sort_by_key(|n| n.as_str());
        networks
    }

    /// Parse an optional network argument, falling back to the default.
    pub fn parse(&self, raw: Option<&str>) -> GatewayResult<Network> {
        match raw {
            Some(s) => s.parse(),
            None => Ok(self.default_network),
        }
    }

    /// Resolve the backend bound to a namespace.
    pub fn backend(&self, network: Network) -> GatewayResult<Arc<dyn ChainBackend>> {
        self.entries
            .get(&network)
            .and_then(|services| services.backend.clone())
            .ok_or_else(|| {
                GatewayError::Internal(format!(
                    "No chain backend configured for network '{network}'"
                ))
            })
    }

    /// Resolve the wallet provider bound to a namespace.
    pub fn wallet(&self, network: Network) -> GatewayResult<Arc<dyn WalletProvider>> {
        self.entries
            .get(&network)
            .and_then(|services| services.wallet.clone())
            .ok_or_else(|| {
                GatewayError::Internal(format!(
                    "No wallet provider configured for network '{network}'"
                ))
            })
    }

    /// Wallet provider for tools that carry no network context.
    pub fn default_wallet(&self) -> GatewayResult<Arc<dyn WalletProvider>> {
        self.wallet(self.default_network)
    }
}
