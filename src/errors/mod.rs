//! Error taxonomy and response envelope.
//!
//! # Responsibilities
//! - Define the stable error taxonomy exposed to callers
//! - Convert internal failures into the response envelope
//! - Never leak raw backend payloads or stack detail to the caller
//!
//! # Design Decisions
//! - Six taxonomy kinds; the wire `code` set never grows per release
//! - Unknown tools are rejected with their own variant, distinct from
//!   internal errors
//! - Normalization (see [`normalize`]) always returns a value, never panics

pub mod normalize;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use normalize::normalize_chain_error;

/// Stable taxonomy tags carried in the response envelope `code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    #[serde(rename = "NETWORK_ERROR")]
    Network,
    #[serde(rename = "TRANSACTION_ERROR")]
    Transaction,
    #[serde(rename = "CONTRACT_ERROR")]
    Contract,
    #[serde(rename = "RATE_LIMIT_ERROR")]
    RateLimit,
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorKind {
    /// The wire tag for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Network => "NETWORK_ERROR",
            ErrorKind::Transaction => "TRANSACTION_ERROR",
            ErrorKind::Contract => "CONTRACT_ERROR",
            ErrorKind::RateLimit => "RATE_LIMIT_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Errors produced anywhere along the dispatch path.
///
/// Every failure a tool call can hit collapses into one of these before it
/// reaches the caller. Variants that originate inside the gateway (validation,
/// rate limiting) keep their own kind through normalization untouched.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed or missing input. Raised before any network contact.
    #[error("{0}")]
    Validation(String),

    /// Backend unreachable, timed out, or refused the connection.
    #[error("{0}")]
    Network(String),

    /// Transaction-specific failure (rejected, dropped, timed out).
    #[error("{0}")]
    Transaction(String),

    /// Contract invocation faulted.
    #[error("{0}")]
    Contract(String),

    /// Per-client quota exceeded. Carries seconds until the window resets.
    #[error("Rate limit exceeded. Try again in {retry_after} seconds")]
    RateLimit { retry_after: u64 },

    /// Tool name not present in the registry.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Anything unclassified. The original message is preserved for
    /// operators; nothing extra is attached on the wire.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// Taxonomy kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(_) | GatewayError::UnknownTool(_) => ErrorKind::Validation,
            GatewayError::Network(_) => ErrorKind::Network,
            GatewayError::Transaction(_) => ErrorKind::Transaction,
            GatewayError::Contract(_) => ErrorKind::Contract,
            GatewayError::RateLimit { .. } => ErrorKind::RateLimit,
            GatewayError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Structured context attached to the envelope, where the variant has any.
    pub fn details(&self) -> Option<Value> {
        match self {
            GatewayError::RateLimit { retry_after } => {
                Some(serde_json::json!({ "retryAfter": retry_after }))
            }
            _ => None,
        }
    }
}

/// Result alias used throughout the dispatch path.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// The `error` half of the response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Human-readable message. Never a raw backend payload.
    pub message: String,
    /// Stable taxonomy tag.
    pub code: String,
    /// Optional structured context (e.g. retry-after for rate limits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&GatewayError> for ErrorEnvelope {
    fn from(err: &GatewayError) -> Self {
        Self {
            message: err.to_string(),
            code: err.kind().code().to_string(),
            details: err.details(),
        }
    }
}
