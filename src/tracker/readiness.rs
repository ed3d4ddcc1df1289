//! Node readiness gate.
//!
//! Lookups against a node that is still syncing from scratch produce nothing
//! but "not found"; the gate holds reconciliation back until either the local
//! or the remote chain has visibly advanced.

use std::time::Duration;

use crate::node::{ChainHeights, NodeClient};

/// True once either chain height clears the threshold.
pub fn is_ready(heights: ChainHeights, ready_height: u64) -> bool {
    heights.local > ready_height || heights.remote > ready_height
}

/// Poll the gate on a flat interval until it opens. Unbounded, no backoff.
pub async fn await_heights(
    node: &NodeClient,
    ready_height: u64,
    interval: Duration,
) -> ChainHeights {
    loop {
        let heights = node.chain_heights().await;
        if is_ready(heights, ready_height) {
            tracing::info!(
                local = heights.local,
                remote = heights.remote,
                "Node ready"
            );
            return heights;
        }
        tracing::debug!(
            local = heights.local,
            remote = heights.remote,
            ready_height,
            "Node not ready yet"
        );
        tokio::time::sleep(interval).await;
    }
}
