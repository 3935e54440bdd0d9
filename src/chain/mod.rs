//! Blockchain-facing subsystem.
//!
//! # Data Flow
//! ```text
//! tool handler
//!     → network.rs (resolve namespace → bindings)
//!     → backend.rs / wallet.rs (capability traits)
//!     → rpc.rs (default JSON-RPC binding, optional)
//! ```

pub mod backend;
pub mod contracts;
pub mod network;
pub mod rpc;
pub mod types;
pub mod wallet;

pub use backend::ChainBackend;
pub use network::{Network, NetworkDirectory, NetworkServices};
pub use rpc::JsonRpcBackend;
pub use types::{ChainError, ChainResult};
pub use wallet::{WalletError, WalletProvider};
