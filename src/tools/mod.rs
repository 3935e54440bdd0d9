//! Tool registry and dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! call envelope {name, arguments}
//!     → catalog.rs (descriptor lookup + input validation)
//!     → dispatcher.rs (rate limit, handler map)
//!     → handlers.rs (namespace resolution, backend/wallet calls)
//!     → response envelope {result} | {error}
//! ```

pub mod catalog;
pub mod dispatcher;
pub mod handlers;

pub use catalog::{ToolDescriptor, CATALOG};
pub use dispatcher::{Dispatcher, ToolCall, ToolResponse};
pub use handlers::HandlerContext;
