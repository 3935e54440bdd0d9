//! NEO N3 tool gateway library.
//!
//! Exposes a fixed catalog of blockchain read/write operations as
//! schema-validated tools, multiplexed across independently configured
//! network namespaces, with asynchronous transaction-confirmation tracking.

pub mod cache;
pub mod chain;
pub mod config;
pub mod errors;
pub mod http;
pub mod lifecycle;
pub mod monitor;
pub mod security;
pub mod tools;
pub mod validation;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use tools::{Dispatcher, ToolCall, ToolResponse};
