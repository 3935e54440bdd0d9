//! Tool dispatch.
//!
//! # Responsibilities
//! - Hold the registration map from tool name to handler, built once
//! - Enforce the per-call order: validate, then rate-limit, then handle
//! - Collapse every failure into the response envelope
//!
//! # Design Decisions
//! - Handlers are boxed async closures keyed by the catalog name; lookup is
//!   O(1) and the set never changes after construction
//! - The dispatcher itself is stateless per call; all shared state lives in
//!   the injected collaborators

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::errors::{ErrorEnvelope, GatewayError, GatewayResult};
use crate::monitor::TransactionMonitor;
use crate::security::RateLimiter;
use crate::tools::catalog;
use crate::tools::handlers::{self, HandlerContext};
use crate::chain::NetworkDirectory;

/// Request envelope accepted by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Response envelope: exactly one of `result` or `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Success { result: Value },
    Failure { error: ErrorEnvelope },
}

impl ToolResponse {
    pub fn result(&self) -> Option<&Value> {
        match self {
            ToolResponse::Success { result } => Some(result),
            ToolResponse::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorEnvelope> {
        match self {
            ToolResponse::Success { .. } => None,
            ToolResponse::Failure { error } => Some(error),
        }
    }
}

type Handler =
    Box<dyn Fn(Arc<HandlerContext>, Value) -> BoxFuture<'static, GatewayResult<Value>> + Send + Sync>;

fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Arc<HandlerContext>, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = GatewayResult<Value>> + Send + 'static,
{
    Box::new(move |ctx, args| f(ctx, args).boxed())
}

/// Routes validated tool calls to their handlers.
pub struct Dispatcher {
    ctx: Arc<HandlerContext>,
    rate_limiter: Arc<RateLimiter>,
    handlers: HashMap<&'static str, Handler>,
}

impl Dispatcher {
    /// Build the dispatcher, registering every catalog tool exactly once.
    pub fn new(
        directory: Arc<NetworkDirectory>,
        rate_limiter: Arc<RateLimiter>,
        monitor: Arc<TransactionMonitor>,
    ) -> Self {
        let ctx = Arc::new(HandlerContext { directory, monitor });

        let mut handlers: HashMap<&'static str, Handler> = HashMap::new();
        handlers.insert("claim_gas", handler(handlers::claim_gas));
        handlers.insert("create_wallet", handler(handlers::create_wallet));
        handlers.insert(
            "estimate_transfer_fees",
            handler(handlers::estimate_transfer_fees),
        );
        handlers.insert("get_balance", handler(handlers::get_balance));
        handlers.insert("get_block", handler(handlers::get_block));
        handlers.insert(
            "get_blockchain_info",
            handler(handlers::get_blockchain_info),
        );
        handlers.insert("get_contract_info", handler(handlers::get_contract_info));
        handlers.insert("get_transaction", handler(handlers::get_transaction));
        handlers.insert("import_wallet", handler(handlers::import_wallet));
        handlers.insert("invoke_contract", handler(handlers::invoke_contract));
        handlers.insert(
            "list_famous_contracts",
            handler(handlers::list_famous_contracts),
        );
        handlers.insert("transfer_assets", handler(handlers::transfer_assets));

        debug_assert_eq!(handlers.len(), catalog::CATALOG.len());

        Self {
            ctx,
            rate_limiter,
            handlers,
        }
    }

    /// Dispatch one call for `client` and produce the response envelope.
    ///
    /// Ordering guarantee: validation completes before the rate-limit
    /// check, which completes before any network resolution consequence.
    pub async fn dispatch(&self, call: ToolCall, client: &str) -> ToolResponse {
        match self.try_dispatch(call, client).await {
            Ok(result) => ToolResponse::Success { result },
            Err(err) => {
                tracing::debug!(code = err.kind().code(), error = %err, "Tool call failed");
                ToolResponse::Failure {
                    error: ErrorEnvelope::from(&err),
                }
            }
        }
    }

    async fn try_dispatch(&self, call: ToolCall, client: &str) -> GatewayResult<Value> {
        let descriptor = catalog::find_tool(&call.name)
            .ok_or_else(|| GatewayError::UnknownTool(call.name.clone()))?;

        catalog::validate_args(descriptor, &call.arguments)?;
        self.rate_limiter.check(client)?;

        tracing::debug!(tool = %call.name, client = %client, "Dispatching tool call");
        let handler = self.handlers.get(descriptor.name).ok_or_else(|| {
            GatewayError::Internal(format!("No handler registered for '{}'", descriptor.name))
        })?;
        handler(Arc::clone(&self.ctx), call.arguments).await
    }

    /// Static discovery listing.
    pub fn list_tools(&self) -> Vec<Value> {
        catalog::list_tools()
    }

    /// Shared handler context (monitor, directory), for the HTTP surface.
    pub fn context(&self) -> Arc<HandlerContext> {
        Arc::clone(&self.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::Network;
    use serde_json::json;
    use std::time::Duration;

    fn empty_dispatcher() -> Dispatcher {
        let directory = Arc::new(NetworkDirectory::new(Network::Testnet));
        let monitor = Arc::new(TransactionMonitor::new(
            Arc::clone(&directory),
            Duration::from_secs(15),
            Duration::from_secs(3600),
            Duration::from_secs(86_400),
        ));
        let limiter = Arc::new(RateLimiter::new(100, 60_000, true));
        Dispatcher::new(directory, limiter, monitor)
    }

    #[tokio::test]
    async fn test_unknown_tool_is_distinct_from_internal() {
        let dispatcher = empty_dispatcher();
        let response = dispatcher
            .dispatch(
                ToolCall {
                    name: "no_such_tool".into(),
                    arguments: json!({}),
                },
                "test",
            )
            .await;
        let error = response.error().unwrap();
        assert!(error.message.contains("Unknown tool"));
        assert_ne!(error.code, "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_envelope_is_exactly_one_of_result_or_error() {
        let dispatcher = empty_dispatcher();
        let response = dispatcher
            .dispatch(
                ToolCall {
                    name: "list_famous_contracts".into(),
                    arguments: json!({}),
                },
                "test",
            )
            .await;
        assert!(response.result().is_some());
        assert!(response.error().is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("result").is_some());
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_validation_precedes_rate_limiting() {
        let directory = Arc::new(NetworkDirectory::new(Network::Testnet));
        let monitor = Arc::new(TransactionMonitor::new(
            Arc::clone(&directory),
            Duration::from_secs(15),
            Duration::from_secs(3600),
            Duration::from_secs(86_400),
        ));
        let limiter = Arc::new(RateLimiter::new(0, 60_000, true));
        let dispatcher = Dispatcher::new(directory, limiter, monitor);

        // Invalid input must be reported as such even when the client is
        // already over quota.
        let response = dispatcher
            .dispatch(
                ToolCall {
                    name: "get_balance".into(),
                    arguments: json!({"address": "bogus"}),
                },
                "test",
            )
            .await;
        assert_eq!(response.error().unwrap().code, "VALIDATION_ERROR");

        // A well-formed call from the same client hits the limiter.
        let response = dispatcher
            .dispatch(
                ToolCall {
                    name: "list_famous_contracts".into(),
                    arguments: json!({}),
                },
                "test",
            )
            .await;
        assert_eq!(response.error().unwrap().code, "RATE_LIMIT_ERROR");
    }
}
