//! Backend failure normalization.
//!
//! Maps raw [`ChainError`] signals to a stable `{kind, user message}` pair.
//! Structured transport codes match first; otherwise the message is scanned
//! against [`MESSAGE_RULES`] top to bottom and the first hit wins. Table
//! order is part of the contract: reordering entries changes observable
//! behavior, so entries are only ever appended.

use crate::chain::types::ChainError;
use crate::errors::{ErrorKind, GatewayError};

/// Ordered substring rules applied to backend messages.
///
/// First match wins. Matching is case-insensitive.
const MESSAGE_RULES: &[(&str, ErrorKind, &str)] = &[
    (
        "insufficient funds",
        ErrorKind::Transaction,
        "Insufficient funds to complete the transaction",
    ),
    (
        "insufficient gas",
        ErrorKind::Transaction,
        "Insufficient GAS to cover network and system fees",
    ),
    (
        "already exists",
        ErrorKind::Transaction,
        "Transaction already exists in the mempool or chain",
    ),
    (
        "vm fault",
        ErrorKind::Contract,
        "Contract execution faulted",
    ),
    (
        "fault",
        ErrorKind::Contract,
        "Contract invocation failed during execution",
    ),
    (
        "unknown contract",
        ErrorKind::Contract,
        "Contract not found on this network",
    ),
    (
        "unknown transaction",
        ErrorKind::Transaction,
        "Transaction not found on this network",
    ),
    (
        "unknown block",
        ErrorKind::Transaction,
        "Block not found on this network",
    ),
    (
        "invalid signature",
        ErrorKind::Transaction,
        "Transaction signature verification failed",
    ),
    (
        "policy",
        ErrorKind::Transaction,
        "Transaction rejected by node policy",
    ),
    (
        "timeout",
        ErrorKind::Network,
        "Blockchain RPC request timed out",
    ),
    (
        "connection refused",
        ErrorKind::Network,
        "Unable to connect to the blockchain RPC endpoint",
    ),
];

fn from_kind(kind: ErrorKind, message: &str) -> GatewayError {
    match kind {
        ErrorKind::Validation => GatewayError::Validation(message.to_string()),
        ErrorKind::Network => GatewayError::Network(message.to_string()),
        ErrorKind::Transaction => GatewayError::Transaction(message.to_string()),
        ErrorKind::Contract => GatewayError::Contract(message.to_string()),
        // Rate limit errors never come out of a backend; kept for totality.
        ErrorKind::RateLimit => GatewayError::RateLimit { retry_after: 0 },
        ErrorKind::Internal => GatewayError::Internal(message.to_string()),
    }
}

/// Classify a raw backend failure.
///
/// Never panics and never drops diagnostic detail: unmatched failures come
/// back as [`GatewayError::Internal`] carrying the original message.
pub fn normalize_chain_error(err: &ChainError) -> GatewayError {
    // Structured transport codes first.
    match err {
        ChainError::ConnectionRefused => {
            return GatewayError::Network(
                "Unable to connect to the blockchain RPC endpoint".to_string(),
            )
        }
        ChainError::Timeout(_) => {
            return GatewayError::Network("Blockchain RPC request timed out".to_string())
        }
        ChainError::HostNotFound => {
            return GatewayError::Network("Blockchain RPC host could not be resolved".to_string())
        }
        ChainError::Rpc { .. } | ChainError::Other(_) => {}
    }

    let raw = err.to_string();
    let haystack = raw.to_lowercase();
    for (needle, kind, message) in MESSAGE_RULES {
        if haystack.contains(needle) {
            return from_kind(*kind, message);
        }
    }

    GatewayError::Internal(raw)
}
