//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wallet_store_transactions` (gauge): entities in the authoritative store
//! - `wallet_tracked_chains` (gauge): polling chains currently running
//! - `wallet_lookup_retries_total` (counter): transient lookup failures
//! - `wallet_transactions_confirmed_total` (counter): chains ended confirmed
//! - `wallet_transactions_errored_total` (counter): chains ended not-found
//! - `wallet_confirmation_requests_total` (counter, by outcome): send requests
//! - `wallet_replica_attachments_total` (counter): display contexts attached
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Prometheus exposition on a dedicated listener

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record the size of the authoritative store.
pub fn record_store_size(count: usize) {
    gauge!("wallet_store_transactions").set(count as f64);
}

/// Record the number of running polling chains.
pub fn record_tracked(count: usize) {
    gauge!("wallet_tracked_chains").set(count as f64);
}

/// Record one transient lookup failure that will be retried.
pub fn record_lookup_retry() {
    counter!("wallet_lookup_retries_total").increment(1);
}

/// Record a transaction reaching confirmed.
pub fn record_confirmation() {
    counter!("wallet_transactions_confirmed_total").increment(1);
}

/// Record a transaction ending in a terminal error.
pub fn record_terminal_error() {
    counter!("wallet_transactions_errored_total").increment(1);
}

/// Record the outcome of one confirmation request.
pub fn record_confirmation_outcome(outcome: &'static str) {
    counter!("wallet_confirmation_requests_total", "outcome" => outcome).increment(1);
}

/// Record a display context attaching to the hub.
pub fn record_attachment() {
    counter!("wallet_replica_attachments_total").increment(1);
}
