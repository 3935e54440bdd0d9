//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router with the call, discovery, and health routes
//! - Wire up middleware (timeout, tracing)
//! - Derive the rate-limit client identifier from the peer address
//! - Serve with graceful shutdown

use axum::{
    extract::{ConnectInfo, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::chain::Network;
use crate::config::GatewayConfig;
use crate::tools::{Dispatcher, ToolCall};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server around an already-wired dispatcher.
    pub fn new(config: GatewayConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState { dispatcher };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/call", post(call_handler))
            .route("/tools", get(tools_handler))
            .route("/health", get(health_handler))
            .route(
                "/transactions/{network}/{txid}",
                get(transaction_status_handler),
            )
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// `POST /call`: dispatch one tool call.
async fn call_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(call): Json<ToolCall>,
) -> Response {
    let request_id = Uuid::new_v4();
    let client = addr.ip().to_string();

    tracing::debug!(
        request_id = %request_id,
        tool = %call.name,
        client = %client,
        "Handling tool call"
    );

    let response = state.dispatcher.dispatch(call, &client).await;
    Json(response).into_response()
}

/// `GET /tools`: static discovery listing, no backend contact.
async fn tools_handler(State(state): State<AppState>) -> Response {
    Json(json!({ "tools": state.dispatcher.list_tools() })).into_response()
}

/// `GET /health`: liveness only; chain reachability is per-call concern.
async fn health_handler() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// `GET /transactions/{network}/{txid}`: monitor record lookup.
async fn transaction_status_handler(
    State(state): State<AppState>,
    Path((network, txid)): Path<(String, String)>,
) -> Response {
    let network: Network = match network.parse() {
        Ok(network) => network,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": { "message": e.to_string(), "code": "VALIDATION_ERROR" } })),
            )
                .into_response()
        }
    };
    let txid = txid.trim_start_matches("0x").to_lowercase();

    match state.dispatcher.context().monitor.status(network, &txid) {
        Some(record) => Json(json!({ "result": record })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": {
                    "message": format!("Transaction {txid} is not tracked on {network}"),
                    "code": "TRANSACTION_ERROR",
                }
            })),
        )
            .into_response(),
    }
}
