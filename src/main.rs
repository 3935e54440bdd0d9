//! NEO N3 tool gateway.
//!
//! Binary entry point: loads configuration, wires the chain backends for
//! each configured network namespace, starts the background tasks
//! (transaction monitor, rate-limit sweeper), and serves the HTTP tool
//! surface until interrupted.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neo_gateway::chain::{JsonRpcBackend, Network, NetworkDirectory, NetworkServices};
use neo_gateway::config::{load_config, GatewayConfig};
use neo_gateway::http::HttpServer;
use neo_gateway::lifecycle::{wait_for_termination, Shutdown};
use neo_gateway::monitor::TransactionMonitor;
use neo_gateway::security::RateLimiter;
use neo_gateway::tools::Dispatcher;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "NEO_GATEWAY_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration first so the log level can honor it.
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => load_config(Path::new(&path))?,
        Err(_) => GatewayConfig::default(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("neo_gateway={},tower_http=warn", config.observability.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        bind_address = %config.listener.bind_address,
        default_network = %config.networks.default,
        "neo-gateway starting"
    );

    // One JSON-RPC backend per configured namespace. No wallet provider is
    // bound here; key-handling tools report a configuration error until one
    // is wired in.
    let mut directory = NetworkDirectory::new(config.networks.default);
    for network in Network::ALL {
        let Some(endpoint) = config.networks.endpoint(network) else {
            continue;
        };
        let backend = JsonRpcBackend::new(&endpoint.rpc_url, endpoint.rpc_timeout_secs)?;
        tracing::info!(network = %network, rpc_url = %endpoint.rpc_url, "Namespace configured");
        directory.bind(
            network,
            NetworkServices {
                backend: Some(Arc::new(backend)),
                wallet: None,
            },
        );
    }
    let directory = Arc::new(directory);

    let shutdown = Shutdown::new();

    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit.max_requests,
        config.rate_limit.window_secs * 1000,
        config.rate_limit.enabled,
    ));
    rate_limiter.spawn_sweeper(shutdown.subscribe());

    let monitor = Arc::new(TransactionMonitor::new(
        Arc::clone(&directory),
        Duration::from_secs(config.monitor.poll_interval_secs),
        Duration::from_secs(config.monitor.pending_timeout_secs),
        Duration::from_secs(config.monitor.record_ttl_secs),
    ));
    Arc::clone(&monitor).start(shutdown.subscribe());

    let dispatcher = Arc::new(Dispatcher::new(directory, rate_limiter, monitor));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, dispatcher);
    server
        .run(listener, async move {
            wait_for_termination().await;
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        })
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
