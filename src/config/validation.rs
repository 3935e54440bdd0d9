//! Configuration validation.
//!
//! Semantic checks running after serde has handled the syntax. All errors
//! are collected, not just the first, so a broken config is fixable in one
//! pass. A missing backend for *every* namespace is the one condition fatal
//! at startup; per-namespace gaps surface later as per-call errors.

use std::fmt;

use crate::chain::Network;
use crate::config::schema::GatewayConfig;

/// One semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn err(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Check a parsed configuration. Pure; returns every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(err(
            "listener.bind_address",
            format!("'{}' is not a valid socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(err("listener.request_timeout_secs", "must be greater than zero"));
    }

    let configured = Network::ALL
        .iter()
        .filter(|n| config.networks.endpoint(**n).is_some())
        .count();
    if configured == 0 {
        errors.push(err("networks", "no network namespace has an RPC endpoint configured"));
    }
    if config.networks.endpoint(config.networks.default).is_none() {
        errors.push(err(
            "networks.default",
            format!("default network '{}' has no RPC endpoint", config.networks.default),
        ));
    }
    for network in Network::ALL {
        if let Some(endpoint) = config.networks.endpoint(network) {
            if endpoint.rpc_url.parse::<url::Url>().is_err() {
                errors.push(err(
                    &format!("networks.{network}.rpc_url"),
                    format!("'{}' is not a valid URL", endpoint.rpc_url),
                ));
            }
            if endpoint.rpc_timeout_secs == 0 {
                errors.push(err(
                    &format!("networks.{network}.rpc_timeout_secs"),
                    "must be greater than zero",
                ));
            }
        }
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(err("rate_limit.max_requests", "must be greater than zero"));
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(err("rate_limit.window_secs", "must be greater than zero"));
    }
    if config.monitor.poll_interval_secs == 0 {
        errors.push(err("monitor.poll_interval_secs", "must be greater than zero"));
    }
    if config.monitor.pending_timeout_secs == 0 {
        errors.push(err("monitor.pending_timeout_secs", "must be greater than zero"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_are_collected() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.rate_limit.window_secs = 0;
        config.monitor.poll_interval_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_no_namespace_at_all_is_fatal() {
        let mut config = GatewayConfig::default();
        config.networks.mainnet = None;
        config.networks.testnet = None;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "networks"));
        assert!(errors.iter().any(|e| e.field == "networks.default"));
    }
}
