//! Transaction lifecycle controller.
//!
//! # Responsibilities
//! - Wait for the node readiness gate, then reconcile pending transactions
//! - Run one self-terminating polling chain per tracked hash
//! - Carry an explicit cancellation handle per chain
//!
//! # Design Decisions
//! - Flat retry interval, unbounded: a lookup failure is never surfaced,
//!   the entity just stays pending
//! - A chain re-schedules itself only after the previous lookup resolved,
//!   so lookups for one hash never overlap
//! - Not-found is terminal; the entity shows as errored and is not retried

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::node::{ActiveNetwork, NodeClient};
use crate::observability::metrics;
use crate::replica::HubClient;
use crate::store::{TxOp, TxStatus, TxUpdate};
use crate::tracker::readiness;
use alloy::primitives::TxHash;

// Re-export TrackerConfig from the config module to avoid duplication
pub use crate::config::schema::TrackerConfig;

/// Drives every tracked transaction from pending to confirmed or errored.
#[derive(Debug, Clone)]
pub struct Tracker {
    hub: HubClient,
    node: NodeClient,
    network: Arc<ActiveNetwork>,
    config: TrackerConfig,
    /// Cancellation handle per running chain, keyed by hash.
    chains: Arc<DashMap<TxHash, watch::Sender<bool>>>,
}

impl Tracker {
    /// Create a new tracker.
    pub fn new(
        hub: HubClient,
        node: NodeClient,
        network: Arc<ActiveNetwork>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            hub,
            node,
            network,
            config,
            chains: Arc::new(DashMap::new()),
        }
    }

    fn poll_interval(&self) -> Duration {
        self.config.poll_interval()
    }

    /// Block until the node readiness gate opens, then reconcile the active
    /// network. Retries on a flat interval, forever.
    pub async fn await_node_readiness(&self) {
        readiness::await_heights(&self.node, self.config.ready_height, self.poll_interval()).await;
        let network = self.network.current();
        self.reconcile(&network).await;
    }

    /// Start a polling chain for every pending hash on the network.
    pub async fn reconcile(&self, network: &str) {
        let pending = self.hub.pending_on(network).await;
        tracing::info!(network, count = pending.len(), "Reconciling pending transactions");
        for hash in pending {
            self.track(hash);
        }
    }

    /// Start a polling chain for a hash. A hash already being tracked keeps
    /// its existing chain; chains never run concurrently for the same hash.
    pub fn track(&self, hash: TxHash) {
        use dashmap::mapref::entry::Entry;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        match self.chains.entry(hash) {
            Entry::Occupied(_) => {
                tracing::debug!(%hash, "Already tracking");
                return;
            }
            Entry::Vacant(slot) => {
                slot.insert(cancel_tx);
            }
        }
        metrics::record_tracked(self.chains.len());

        let tracker = self.clone();
        tokio::spawn(async move {
            tracker.poll_chain(hash, cancel_rx).await;
            // The chain dropped its receiver; only reap the entry if it is
            // ours, not a chain started after an abandon.
            tracker.chains.remove_if(&hash, |_, cancel| cancel.is_closed());
            metrics::record_tracked(tracker.chains.len());
        });
    }

    /// Terminate the polling chain for a hash, if one is running.
    pub fn abandon(&self, hash: &TxHash) -> bool {
        match self.chains.remove(hash) {
            Some((_, cancel)) => {
                let _ = cancel.send(true);
                true
            }
            None => false,
        }
    }

    /// Terminate every running chain.
    pub fn abandon_all(&self) {
        let hashes: Vec<TxHash> = self.chains.iter().map(|entry| *entry.key()).collect();
        for hash in hashes {
            self.abandon(&hash);
        }
    }

    /// Switch the active network, applying the configured cancellation
    /// policy, then reconcile the new network.
    pub async fn set_active_network(&self, network: &str) {
        let previous = self.network.switch(network);
        if previous.as_str() == network {
            return;
        }
        tracing::info!(from = %previous, to = network, "Active network changed");
        if self.config.cancel_on_network_change {
            self.abandon_all();
        }
        self.reconcile(network).await;
    }

    /// Number of chains currently polling.
    pub fn tracked_count(&self) -> usize {
        self.chains.len()
    }

    async fn poll_chain(&self, hash: TxHash, mut cancelled: watch::Receiver<bool>) {
        tracing::debug!(%hash, "Polling for confirmation");
        loop {
            if *cancelled.borrow() {
                tracing::debug!(%hash, "Polling abandoned");
                return;
            }
            match self.node.transaction_by_hash(hash).await {
                Err(error) => {
                    // Transient by definition; the entity stays pending.
                    tracing::debug!(%hash, %error, "Lookup failed, will retry");
                    metrics::record_lookup_retry();
                    if self.wait_or_cancelled(&mut cancelled).await {
                        return;
                    }
                }
                Ok(None) => {
                    tracing::warn!(%hash, "Transaction not found on node");
                    self.hub
                        .apply(TxOp::Merge {
                            hash,
                            update: TxUpdate::not_found(),
                        })
                        .await;
                    metrics::record_terminal_error();
                    return;
                }
                Ok(Some(fields)) => {
                    let committed = self
                        .hub
                        .apply(TxOp::Merge {
                            hash,
                            update: TxUpdate::from_fields(fields),
                        })
                        .await;
                    match committed.map(|tx| tx.status()) {
                        Some(TxStatus::Confirmed { block }) => {
                            tracing::info!(%hash, block, "Transaction confirmed");
                            metrics::record_confirmation();
                            return;
                        }
                        Some(TxStatus::Errored) => return,
                        Some(TxStatus::Pending) => {
                            if self.wait_or_cancelled(&mut cancelled).await {
                                return;
                            }
                        }
                        // Hub gone; nothing left to update.
                        None => return,
                    }
                }
            }
        }
    }

    /// Sleep one poll interval. True means the chain was cancelled meanwhile.
    async fn wait_or_cancelled(&self, cancelled: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(self.poll_interval()) => false,
            changed = cancelled.changed() => match changed {
                Ok(()) => *cancelled.borrow(),
                Err(_) => true,
            },
        }
    }
}
