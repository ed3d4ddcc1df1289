//! Node-facing types and error definitions.

use arc_swap::ArcSwap;
use std::sync::Arc;
use thiserror::Error;

// Re-export NodeConfig from the config module to avoid duplication
pub use crate::config::schema::NodeConfig;

/// Errors that can occur while talking to the node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Endpoint could not be parsed.
    #[error("invalid node RPC URL '{0}'")]
    InvalidUrl(String),

    /// Transport-level failure: connection refused, timeout, malformed reply.
    #[error("node unreachable: {0}")]
    Unreachable(String),

    /// The node answered with a JSON-RPC error object.
    #[error("node rejected request: {message} (code {code})")]
    Rejected { code: i64, message: String },
}

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Chain heights reported by the readiness gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainHeights {
    /// Height of the local node.
    pub local: u64,
    /// Height of the remote fallback endpoint.
    pub remote: u64,
}

/// Network the wallet is currently operating on. Swapped atomically when the
/// user switches networks; every registration consults it at commit time.
pub struct ActiveNetwork(ArcSwap<String>);

impl std::fmt::Debug for ActiveNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ActiveNetwork").field(&self.current()).finish()
    }
}

impl ActiveNetwork {
    pub fn new(network: &str) -> Self {
        Self(ArcSwap::from_pointee(network.to_string()))
    }

    /// The current network identifier.
    pub fn current(&self) -> Arc<String> {
        self.0.load_full()
    }

    /// Replace the active network, returning the previous one.
    pub fn switch(&self, network: &str) -> Arc<String> {
        self.0.swap(Arc::new(network.to_string()))
    }
}
