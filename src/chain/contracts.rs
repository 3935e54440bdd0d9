//! Registry of well-known N3 contracts.
//!
//! Static data consulted by `list_famous_contracts` and
//! `get_contract_info`; no backend contact is involved.

use serde::Serialize;

use crate::chain::network::Network;

/// A well-known contract and where it is deployed.
#[derive(Debug, Clone, Serialize)]
pub struct FamousContract {
    pub name: &'static str,
    /// Script hash, 40 hex chars without prefix.
    pub script_hash: &'static str,
    pub description: &'static str,
    /// Networks the contract exists on.
    pub networks: &'static [Network],
}

const BOTH: &[Network] = &[Network::Mainnet, Network::Testnet];
const MAINNET_ONLY: &[Network] = &[Network::Mainnet];

/// The registry, ordered by name.
pub const FAMOUS_CONTRACTS: &[FamousContract] = &[
    FamousContract {
        name: "ContractManagement",
        script_hash: "fffdc93764dbaddd97c48f252a53ea4643faa3fd",
        description: "Native contract managing deployment and updates",
        networks: BOTH,
    },
    FamousContract {
        name: "Flamingo FLM",
        script_hash: "f0151f528127558851b39c2cd8aa47da7418ab28",
        description: "Flamingo Finance governance token",
        networks: MAINNET_ONLY,
    },
    FamousContract {
        name: "GasToken",
        script_hash: "d2a4cff31913016155e38e474a2c06d08be276cf",
        description: "Native GAS utility token",
        networks: BOTH,
    },
    FamousContract {
        name: "NeoToken",
        script_hash: "ef4073a0f2b305a38ec4050e4d3d28bc40ea63f5",
        description: "Native NEO governance token",
        networks: BOTH,
    },
    FamousContract {
        name: "Neo Name Service",
        script_hash: "50ac1c37690cc2cfc594472833cf57505d5f46de",
        description: "Domain name service for N3 addresses",
        networks: MAINNET_ONLY,
    },
    FamousContract {
        name: "OracleContract",
        script_hash: "fe924b7cfe89ddd271abaf7210a80a7e11178758",
        description: "Native oracle request contract",
        networks: BOTH,
    },
    FamousContract {
        name: "PolicyContract",
        script_hash: "cc5e4edd9f5f8dba8bb65734541df7a1c081c67b",
        description: "Native contract exposing network policy parameters",
        networks: BOTH,
    },
    FamousContract {
        name: "RoleManagement",
        script_hash: "49cf4e5378ffcd4dec034fd98a174c5491e395e2",
        description: "Native contract assigning node roles",
        networks: BOTH,
    },
];

/// Contracts available on `network`, or the whole registry when `None`.
pub fn list_contracts(network: Option<Network>) -> Vec<&'static FamousContract> {
    FAMOUS_CONTRACTS
        .iter()
        .filter(|contract| network.is_none_or(|n| contract.networks.contains(&n)))
        .collect()
}

/// Look up a contract by case-insensitive name or by script hash
/// (`0x` prefix tolerated).
pub fn find_contract(name_or_hash: &str) -> Option<&'static FamousContract> {
    let needle = name_or_hash
        .strip_prefix("0x")
        .unwrap_or(name_or_hash)
        .to_lowercase();
    FAMOUS_CONTRACTS.iter().find(|contract| {
        contract.script_hash == needle || contract.name.to_lowercase() == needle
    })
}
