//! Wallet Transaction Hub (v1)
//!
//! The authoritative process behind a desktop wallet's transaction views.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────────┐
//!                    │                   WALLET HUB                       │
//!                    │                                                    │
//!   send request     │  ┌─────────┐     ┌──────────┐     ┌────────────┐  │
//!   ─────────────────┼─▶│ confirm │────▶│  store   │◀────│  tracker   │  │
//!                    │  │mediator │ Add │   hub    │Merge│poll chains │  │
//!                    │  └─────────┘     └────┬─────┘     └─────┬──────┘  │
//!                    │                       │                 │          │
//!                    │              broadcast│          lookups│          │
//!                    │                       ▼                 ▼          │
//!   display contexts │  ┌──────────────────────────┐   ┌────────────┐    │
//!   ◀────────────────┼──│ projections (snapshot +  │   │ node RPC   │────┼──▶ node
//!                    │  │ deltas, dispatch back)   │   │ client     │    │
//!                    │  └──────────────────────────┘   └────────────┘    │
//!                    │                                                    │
//!                    │  ┌──────────────────────────────────────────────┐ │
//!                    │  │ cross-cutting: config · storage · lifecycle  │ │
//!                    │  │               · observability                │ │
//!                    │  └──────────────────────────────────────────────┘ │
//!                    └────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::sync::Arc;

use wallet_hub::config::{load_config, HubConfig};
use wallet_hub::lifecycle::Shutdown;
use wallet_hub::node::{ActiveNetwork, NodeClient};
use wallet_hub::observability::{logging, metrics};
use wallet_hub::replica::StoreHub;
use wallet_hub::storage::KvStore;
use wallet_hub::store::TxStore;
use wallet_hub::tracker::Tracker;

#[derive(Parser)]
#[command(name = "wallet-hub")]
#[command(about = "Transaction tracking and confirmation hub for a desktop wallet", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "wallet-hub.toml")]
    config: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        HubConfig::default()
    };

    logging::init(&config.observability);
    tracing::info!("wallet-hub v0.1.0 starting");
    tracing::info!(
        rpc_url = %config.node.rpc_url,
        network = %config.node.network,
        poll_interval_ms = config.tracker.poll_interval_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Restore persisted transaction state before the hub starts.
    let storage = if config.storage.enabled {
        Some(KvStore::open(&config.storage.path)?)
    } else {
        None
    };
    let initial = storage.as_ref().map(StoreHub::restore).unwrap_or_else(TxStore::new);
    tracing::info!(transactions = initial.len(), "Restored transaction state");

    let shutdown = Shutdown::new();
    let (hub, client) = StoreHub::new(initial, storage, shutdown.subscribe());
    let hub_task = tokio::spawn(hub.run());

    let node = NodeClient::new(config.node.clone())?;
    let network = Arc::new(ActiveNetwork::new(&config.node.network));
    let tracker = Tracker::new(client, node, network, config.tracker.clone());

    // Hold reconciliation until the node has visibly synced.
    tokio::spawn({
        let tracker = tracker.clone();
        async move {
            tracker.await_node_readiness().await;
        }
    });

    shutdown.trigger_on_ctrl_c().await;

    // The hub persists and closes storage on its way out.
    hub_task.await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
