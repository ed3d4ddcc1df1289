//! Node integration subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (RPC URLs, timeout)
//!     → client.rs (JSON-RPC calls, local endpoint + remote fallback)
//!     → tracker (transaction lookups, chain heights)
//! ```
//!
//! # Design Decisions
//! - The node is an opaque collaborator: success, not-found, or transient failure
//! - All RPC calls carry a configurable timeout
//! - Lookup failures are never fatal; the tracker retries on a flat interval

pub mod client;
pub mod types;

pub use client::NodeClient;
pub use types::{ActiveNetwork, ChainHeights, NodeConfig, NodeError};
