//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Every
//! section defaults so a minimal config file (or none) still yields a
//! runnable gateway.

use serde::{Deserialize, Serialize};

use crate::chain::Network;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Per-namespace chain endpoints.
    pub networks: NetworksConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Transaction monitor configuration.
    pub monitor: MonitorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Chain endpoints per namespace.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworksConfig {
    /// Namespace used when a call omits `network`.
    pub default: Network,

    pub mainnet: Option<EndpointConfig>,
    pub testnet: Option<EndpointConfig>,
}

impl Default for NetworksConfig {
    fn default() -> Self {
        Self {
            default: Network::Testnet,
            mainnet: None,
            testnet: Some(EndpointConfig::default()),
        }
    }
}

impl NetworksConfig {
    pub fn endpoint(&self, network: Network) -> Option<&EndpointConfig> {
        match network {
            Network::Mainnet => self.mainnet.as_ref(),
            Network::Testnet => self.testnet.as_ref(),
        }
    }
}

/// One namespace's RPC binding.
///
/// `rpc_url` carries no serde default: a namespace section must name its
/// own endpoint, so a bare `[networks.mainnet]` table is a parse error
/// rather than a silent binding to the wrong chain.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// RPC request timeout in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
}

fn default_rpc_timeout_secs() -> u64 {
    10
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://testnet1.neo.coz.io:443".to_string(),
            rpc_timeout_secs: default_rpc_timeout_secs(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Maximum requests per window per client.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 60,
            window_secs: 60,
        }
    }
}

/// Transaction monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Poll interval in seconds.
    pub poll_interval_secs: u64,

    /// Continuous-absence window after which a pending transaction is
    /// declared failed, in seconds.
    pub pending_timeout_secs: u64,

    /// Retention for finished records, in seconds.
    pub record_ttl_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 15,
            pending_timeout_secs: 3600,
            record_ttl_secs: 86_400,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_runnable() {
        let config = GatewayConfig::default();
        assert_eq!(config.networks.default, Network::Testnet);
        assert!(config.networks.testnet.is_some());
        assert_eq!(config.monitor.poll_interval_secs, 15);
        assert_eq!(config.monitor.pending_timeout_secs, 3600);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "0.0.0.0:9000"

            [networks]
            default = "mainnet"

            [networks.mainnet]
            rpc_url = "https://mainnet1.neo.coz.io:443"
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
        assert_eq!(config.listener.request_timeout_secs, 30);
        assert_eq!(config.networks.default, Network::Mainnet);
        assert!(config.networks.mainnet.is_some());
        assert_eq!(config.rate_limit.max_requests, 60);
    }

    #[test]
    fn test_endpoint_section_requires_its_own_url() {
        // An empty namespace table must fail to parse instead of silently
        // inheriting another chain's endpoint.
        let result = toml::from_str::<GatewayConfig>(
            r#"
            [networks.mainnet]
            "#,
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("rpc_url"));

        let config: GatewayConfig = toml::from_str(
            r#"
            [networks.mainnet]
            rpc_url = "https://mainnet1.neo.coz.io:443"
            "#,
        )
        .unwrap();
        let mainnet = config.networks.mainnet.unwrap();
        assert_eq!(mainnet.rpc_url, "https://mainnet1.neo.coz.io:443");
        assert_eq!(mainnet.rpc_timeout_secs, 10);
    }
}
