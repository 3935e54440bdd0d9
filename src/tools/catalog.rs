//! Static tool catalog.
//!
//! # Responsibilities
//! - Describe every tool the gateway exposes: name, input contract, scope
//! - Drive argument validation from the descriptors
//! - Render the discovery listing without any backend contact
//!
//! The catalog is immutable and built into the binary; registration happens
//! once when the dispatcher wires handlers to these names.

use serde_json::{json, Map, Value};
use std::str::FromStr;

use crate::chain::Network;
use crate::errors::{GatewayError, GatewayResult};
use crate::validation;

/// Format constraint applied to a single argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// 34-character N3 address.
    Address,
    /// 64-hex transaction or block hash, `0x` tolerated.
    TxHash,
    /// 40-hex contract script hash, `0x` tolerated.
    ScriptHash,
    /// Non-negative decimal, string or number, normalized to string.
    Amount,
    /// Minimum-length secret.
    Password,
    /// WIF or hex private key; shape only, parsing is the wallet's job.
    Secret,
    /// One of the closed network namespace set.
    Network,
    /// Block hash or height.
    BlockRef,
    /// Strict boolean.
    Boolean,
    /// Array of contract parameters, passed through.
    ArgArray,
    /// Any non-empty string.
    Text,
}

/// One named argument in a tool's input contract.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

/// A tool's immutable registration entry.
#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// Ordered input contract; order is part of the published schema.
    pub params: &'static [ParamSpec],
    /// Whether the call resolves a network namespace.
    pub network_scoped: bool,
    /// Whether the call can move funds. `invoke_contract` is conditional
    /// and enforces its guard in the handler.
    pub mutating: bool,
}

const NETWORK_PARAM: ParamSpec = ParamSpec {
    name: "network",
    kind: ParamKind::Network,
    required: false,
    description: "Target network: 'mainnet' or 'testnet' (default from config)",
};

const CONFIRM_PARAM: ParamSpec = ParamSpec {
    name: "confirm",
    kind: ParamKind::Boolean,
    required: true,
    description: "Must be true to authorize moving funds",
};

/// Every tool the gateway exposes, ordered by name.
pub const CATALOG: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: "claim_gas",
        description: "Claim accumulated GAS for the key's address",
        params: &[
            ParamSpec {
                name: "fromWIF",
                kind: ParamKind::Secret,
                required: true,
                description: "WIF of the claiming account",
            },
            CONFIRM_PARAM,
            NETWORK_PARAM,
        ],
        network_scoped: true,
        mutating: true,
    },
    ToolDescriptor {
        name: "create_wallet",
        description: "Generate a new wallet account encrypted with a password",
        params: &[ParamSpec {
            name: "password",
            kind: ParamKind::Password,
            required: true,
            description: "Password encrypting the new key (min 8 chars)",
        }],
        network_scoped: false,
        mutating: false,
    },
    ToolDescriptor {
        name: "estimate_transfer_fees",
        description: "Estimate network and system fees for a transfer without sending it",
        params: &[
            ParamSpec {
                name: "fromAddress",
                kind: ParamKind::Address,
                required: true,
                description: "Sending address",
            },
            ParamSpec {
                name: "toAddress",
                kind: ParamKind::Address,
                required: true,
                description: "Receiving address",
            },
            ParamSpec {
                name: "asset",
                kind: ParamKind::Text,
                required: true,
                description: "Asset symbol (NEO, GAS) or token script hash",
            },
            ParamSpec {
                name: "amount",
                kind: ParamKind::Amount,
                required: true,
                description: "Amount to transfer",
            },
            NETWORK_PARAM,
        ],
        network_scoped: true,
        mutating: false,
    },
    ToolDescriptor {
        name: "get_balance",
        description: "Asset balances for an address",
        params: &[
            ParamSpec {
                name: "address",
                kind: ParamKind::Address,
                required: true,
                description: "Address to query",
            },
            NETWORK_PARAM,
        ],
        network_scoped: true,
        mutating: false,
    },
    ToolDescriptor {
        name: "get_block",
        description: "Fetch a block by hash or height",
        params: &[
            ParamSpec {
                name: "hashOrHeight",
                kind: ParamKind::BlockRef,
                required: true,
                description: "Block hash (64 hex) or block height",
            },
            NETWORK_PARAM,
        ],
        network_scoped: true,
        mutating: false,
    },
    ToolDescriptor {
        name: "get_blockchain_info",
        description: "Current height and namespace information",
        params: &[NETWORK_PARAM],
        network_scoped: true,
        mutating: false,
    },
    ToolDescriptor {
        name: "get_contract_info",
        description: "Details for a well-known contract by name or script hash",
        params: &[
            ParamSpec {
                name: "nameOrHash",
                kind: ParamKind::Text,
                required: true,
                description: "Contract name or 40-hex script hash",
            },
            NETWORK_PARAM,
        ],
        network_scoped: true,
        mutating: false,
    },
    ToolDescriptor {
        name: "get_transaction",
        description: "Fetch a transaction by id",
        params: &[
            ParamSpec {
                name: "txid",
                kind: ParamKind::TxHash,
                required: true,
                description: "Transaction hash (64 hex, 0x tolerated)",
            },
            NETWORK_PARAM,
        ],
        network_scoped: true,
        mutating: false,
    },
    ToolDescriptor {
        name: "import_wallet",
        description: "Import an account from a WIF or hex private key",
        params: &[
            ParamSpec {
                name: "key",
                kind: ParamKind::Secret,
                required: true,
                description: "WIF or hex private key",
            },
            ParamSpec {
                name: "password",
                kind: ParamKind::Password,
                required: false,
                description: "Optional password for encrypting the import",
            },
        ],
        network_scoped: false,
        mutating: false,
    },
    ToolDescriptor {
        name: "invoke_contract",
        description: "Invoke a contract method; read-only unless a signing key is provided",
        params: &[
            ParamSpec {
                name: "scriptHash",
                kind: ParamKind::ScriptHash,
                required: true,
                description: "Contract script hash",
            },
            ParamSpec {
                name: "operation",
                kind: ParamKind::Text,
                required: true,
                description: "Method name to invoke",
            },
            ParamSpec {
                name: "args",
                kind: ParamKind::ArgArray,
                required: false,
                description: "Contract parameters, passed through to the node",
            },
            ParamSpec {
                name: "fromWIF",
                kind: ParamKind::Secret,
                required: false,
                description: "Signing key; presence switches to the write path",
            },
            ParamSpec {
                name: "confirm",
                kind: ParamKind::Boolean,
                required: false,
                description: "Required (true) when fromWIF is present",
            },
            NETWORK_PARAM,
        ],
        network_scoped: true,
        mutating: false,
    },
    ToolDescriptor {
        name: "list_famous_contracts",
        description: "List well-known contracts, optionally filtered by network",
        params: &[NETWORK_PARAM],
        network_scoped: true,
        mutating: false,
    },
    ToolDescriptor {
        name: "transfer_assets",
        description: "Transfer NEO, GAS, or a NEP-17 token between addresses",
        params: &[
            ParamSpec {
                name: "fromWIF",
                kind: ParamKind::Secret,
                required: true,
                description: "WIF of the sending account",
            },
            ParamSpec {
                name: "toAddress",
                kind: ParamKind::Address,
                required: true,
                description: "Receiving address",
            },
            ParamSpec {
                name: "asset",
                kind: ParamKind::Text,
                required: true,
                description: "Asset symbol (NEO, GAS) or token script hash",
            },
            ParamSpec {
                name: "amount",
                kind: ParamKind::Amount,
                required: true,
                description: "Amount to transfer",
            },
            CONFIRM_PARAM,
            NETWORK_PARAM,
        ],
        network_scoped: true,
        mutating: true,
    },
];

/// Look up a tool by exact name.
pub fn find_tool(name: &str) -> Option<&'static ToolDescriptor> {
    CATALOG.iter().find(|tool| tool.name == name)
}

fn validate_field(spec: &ParamSpec, value: &Value) -> GatewayResult<()> {
    let as_str = || {
        value.as_str().ok_or_else(|| {
            GatewayError::Validation(format!("Field '{}' must be a string", spec.name))
        })
    };
    match spec.kind {
        ParamKind::Address => validation::validate_address(as_str()?).map(drop),
        ParamKind::TxHash => validation::validate_tx_hash(as_str()?).map(drop),
        ParamKind::ScriptHash => validation::validate_script_hash(as_str()?).map(drop),
        ParamKind::Amount => validation::validate_amount(value).map(drop),
        ParamKind::Password => validation::validate_password(as_str()?).map(drop),
        ParamKind::Secret | ParamKind::Text => {
            if as_str()?.is_empty() {
                return Err(GatewayError::Validation(format!(
                    "Field '{}' must not be empty",
                    spec.name
                )));
            }
            Ok(())
        }
        ParamKind::Network => Network::from_str(as_str()?).map(drop),
        ParamKind::BlockRef => match value {
            Value::Number(n) if n.is_u64() => Ok(()),
            Value::String(s) => {
                if s.chars().all(|c| c.is_ascii_digit()) && !s.is_empty() {
                    Ok(())
                } else {
                    validation::validate_tx_hash(s).map(drop)
                }
            }
            _ => Err(GatewayError::Validation(format!(
                "Field '{}' must be a block hash or a non-negative height",
                spec.name
            ))),
        },
        ParamKind::Boolean => {
            value.as_bool().map(drop).ok_or_else(|| {
                GatewayError::Validation(format!("Field '{}' must be a boolean", spec.name))
            })
        }
        ParamKind::ArgArray => {
            value.as_array().map(drop).ok_or_else(|| {
                GatewayError::Validation(format!("Field '{}' must be an array", spec.name))
            })
        }
    }
}

/// Validate an arguments object against a descriptor.
///
/// Pure and total: never contacts the network, and every input either
/// passes or yields exactly one validation error (the first, in contract
/// order).
pub fn validate_args(descriptor: &ToolDescriptor, args: &Value) -> GatewayResult<()> {
    if !args.is_object() && !args.is_null() {
        return Err(GatewayError::Validation(
            "Arguments must be an object".to_string(),
        ));
    }
    for spec in descriptor.params {
        match args.get(spec.name) {
            Some(Value::Null) | None => {
                if spec.required {
                    return Err(GatewayError::Validation(format!(
                        "Missing required field: {}",
                        spec.name
                    )));
                }
            }
            Some(value) => validate_field(spec, value)?,
        }
    }
    Ok(())
}

fn schema_type(kind: ParamKind) -> Value {
    match kind {
        ParamKind::Amount => json!(["string", "number"]),
        ParamKind::BlockRef => json!(["string", "integer"]),
        ParamKind::Boolean => json!("boolean"),
        ParamKind::ArgArray => json!("array"),
        _ => json!("string"),
    }
}

impl ToolDescriptor {
    /// JSON-schema rendering of the input contract, for discovery.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for spec in self.params {
            properties.insert(
                spec.name.to_string(),
                json!({
                    "type": schema_type(spec.kind),
                    "description": spec.description,
                }),
            );
            if spec.required {
                required.push(spec.name);
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Discovery entry: name, description, input schema.
    pub fn describe(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }
}

/// The full discovery listing. Static; no backend contact.
pub fn list_tools() -> Vec<Value> {
    CATALOG.iter().map(ToolDescriptor::describe).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "NXV7ZhHiyM1aHXwvUNBLNAkCwZ6wgeKyMZ";

    #[test]
    fn test_catalog_names_are_unique_and_sorted() {
        let names: Vec<&str> = CATALOG.iter().map(|t| t.name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn test_validate_args_reports_first_missing_field() {
        let tool = find_tool("transfer_assets").unwrap();
        let err = validate_args(tool, &json!({"toAddress": ADDRESS})).unwrap_err();
        assert!(err.to_string().contains("fromWIF"));
    }

    #[test]
    fn test_validate_args_checks_field_formats() {
        let tool = find_tool("get_balance").unwrap();
        assert!(validate_args(tool, &json!({"address": ADDRESS})).is_ok());
        assert!(validate_args(tool, &json!({"address": "bogus"})).is_err());
        assert!(validate_args(tool, &json!({"address": ADDRESS, "network": "ropsten"})).is_err());
    }

    #[test]
    fn test_block_ref_accepts_height_and_hash() {
        let tool = find_tool("get_block").unwrap();
        assert!(validate_args(tool, &json!({"hashOrHeight": 123})).is_ok());
        assert!(validate_args(tool, &json!({"hashOrHeight": "123"})).is_ok());
        let hash = "b".repeat(64);
        assert!(validate_args(tool, &json!({"hashOrHeight": hash})).is_ok());
        assert!(validate_args(tool, &json!({"hashOrHeight": "xyz"})).is_err());
    }

    #[test]
    fn test_optional_fields_may_be_omitted_but_not_malformed() {
        let tool = find_tool("invoke_contract").unwrap();
        let base = json!({"scriptHash": "f".repeat(40), "operation": "symbol"});
        assert!(validate_args(tool, &base).is_ok());

        let mut bad = base.clone();
        bad["args"] = json!("not-an-array");
        assert!(validate_args(tool, &bad).is_err());
    }

    #[test]
    fn test_schema_lists_required_fields() {
        let tool = find_tool("transfer_assets").unwrap();
        let schema = tool.input_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(required.contains(&"confirm"));
        assert!(required.contains(&"fromWIF"));
        assert!(!required.contains(&"network"));
    }
}
