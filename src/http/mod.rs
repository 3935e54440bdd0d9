//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! POST /call {name, arguments}
//!     → server.rs (peer id, request id)
//!     → tools::Dispatcher (validate, rate-limit, handle)
//!     → {result} | {error: {message, code}}
//! ```

pub mod server;

pub use server::HttpServer;
