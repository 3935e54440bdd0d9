//! Input validation.
//!
//! # Responsibilities
//! - Field-level format checks for every tool argument
//! - Deterministic and total: every input passes or yields exactly one error
//! - Never contacts the network; pure functions only
//!
//! Hex-prefixed hashes (`0x...`) are tolerated on input; the prefix is
//! stripped for internal use, while responses echo whatever form the backend
//! returns.

use crate::errors::{GatewayError, GatewayResult};
use serde_json::Value;

/// N3 address length, base58check of a versioned script hash.
const ADDRESS_LEN: usize = 34;
/// Required first character for N3 addresses.
const ADDRESS_PREFIX: char = 'N';
/// Minimum accepted password length; no maximum is enforced.
const MIN_PASSWORD_LEN: usize = 8;

/// Base58 alphabet check (Bitcoin variant, as used by N3 addresses).
fn is_base58(c: char) -> bool {
    c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l')
}

/// Validate an N3 address. Returns the address unchanged on success.
pub fn validate_address(address: &str) -> GatewayResult<String> {
    if address.len() != ADDRESS_LEN {
        return Err(GatewayError::Validation(format!(
            "Invalid address: expected {} characters, got {}",
            ADDRESS_LEN,
            address.len()
        )));
    }
    if !address.starts_with(ADDRESS_PREFIX) {
        return Err(GatewayError::Validation(format!(
            "Invalid address: must start with '{ADDRESS_PREFIX}'"
        )));
    }
    if !address.chars().all(is_base58) {
        return Err(GatewayError::Validation(
            "Invalid address: contains characters outside the base58 alphabet".to_string(),
        ));
    }
    Ok(address.to_string())
}

fn validate_hex_id(value: &str, expected_len: usize, what: &str) -> GatewayResult<String> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    if stripped.len() != expected_len {
        return Err(GatewayError::Validation(format!(
            "Invalid {what}: expected {expected_len} hex characters, got {}",
            stripped.len()
        )));
    }
    if !stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GatewayError::Validation(format!(
            "Invalid {what}: contains non-hex characters"
        )));
    }
    Ok(stripped.to_lowercase())
}

/// Validate a transaction or block hash. Returns the 64-hex id without the
/// `0x` prefix.
pub fn validate_tx_hash(hash: &str) -> GatewayResult<String> {
    validate_hex_id(hash, 64, "transaction hash")
}

/// Validate a contract script hash. Returns the 40-hex id without the `0x`
/// prefix.
pub fn validate_script_hash(hash: &str) -> GatewayResult<String> {
    validate_hex_id(hash, 40, "script hash")
}

/// Validate an asset amount given as a string or JSON number.
///
/// Normalized to its string form so arbitrary precision survives; amounts
/// are never parsed into floats inside the gateway.
pub fn validate_amount(value: &Value) -> GatewayResult<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(GatewayError::Validation(
                "Invalid amount: expected a decimal string or number".to_string(),
            ))
        }
    };

    let mut chars = text.chars();
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in chars.by_ref() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => {
                return Err(GatewayError::Validation(format!(
                    "Invalid amount '{text}': not a non-negative decimal"
                )))
            }
        }
    }
    if !seen_digit {
        return Err(GatewayError::Validation(format!(
            "Invalid amount '{text}': not a non-negative decimal"
        )));
    }
    Ok(text)
}

/// Validate a wallet password. Only a minimum length is enforced.
pub fn validate_password(password: &str) -> GatewayResult<String> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(GatewayError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(password.to_string())
}

/// Extract a required string argument.
pub fn required_str<'a>(args: &'a Value, field: &str) -> GatewayResult<&'a str> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::Validation(format!("Missing required field: {field}")))
}

/// Extract an optional string argument.
pub fn optional_str<'a>(args: &'a Value, field: &str) -> Option<&'a str> {
    args.get(field).and_then(Value::as_str)
}

/// Two-step commit guard for mutating tools.
///
/// Checked before any backend contact so an unconfirmed write attempt never
/// costs an RPC round trip.
pub fn require_confirmation(args: &Value) -> GatewayResult<()> {
    match args.get("confirm").and_then(Value::as_bool) {
        Some(true) => Ok(()),
        _ => Err(GatewayError::Validation(
            "Confirmation required: set confirm=true to authorize this operation".to_string(),
        )),
    }
}
