//! Confirmation polling integration tests against a mock JSON-RPC node.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::TxHash;
use serde_json::{json, Value};

use wallet_hub::lifecycle::Shutdown;
use wallet_hub::node::{ActiveNetwork, NodeClient};
use wallet_hub::store::{TrackedTx, TxOp, TxStatus, TxStore, TxUpdate, NOT_FOUND_ERROR};
use wallet_hub::tracker::Tracker;

mod common;

fn tracker_for(addr: SocketAddr, client: wallet_hub::replica::HubClient) -> Tracker {
    let node = NodeClient::new(common::node_config(addr)).unwrap();
    let network = Arc::new(ActiveNetwork::new("main"));
    Tracker::new(client, node, network, common::fast_tracker_config())
}

fn pending_result(hash: TxHash) -> Value {
    json!({ "hash": hash, "blockNumber": null, "from": "0xab" })
}

fn confirmed_result(hash: TxHash, block: &str) -> Value {
    json!({ "hash": hash, "blockNumber": block, "from": "0xab" })
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test]
async fn test_poll_until_confirmed() {
    let addr: SocketAddr = "127.0.0.1:29101".parse().unwrap();
    let hash = TxHash::repeat_byte(1);

    let calls = Arc::new(AtomicU32::new(0));
    let seen = calls.clone();
    common::start_mock_node(addr, move |method, _| {
        let seen = seen.clone();
        async move {
            match method.as_str() {
                "eth_getTransactionByHash" => {
                    let call = seen.fetch_add(1, Ordering::SeqCst);
                    if call < 2 {
                        Some(pending_result(hash))
                    } else {
                        Some(confirmed_result(hash, "0x5"))
                    }
                }
                _ => Some(json!(null)),
            }
        }
    })
    .await;

    let shutdown = Shutdown::new();
    let (client, _hub) = common::spawn_hub(TxStore::new(), None, &shutdown);
    let tracker = tracker_for(addr, client.clone());

    client
        .apply(TxOp::Add {
            transaction: TrackedTx::new(hash),
            network: "main".to_string(),
        })
        .await;
    tracker.track(hash);

    tokio::time::sleep(Duration::from_millis(400)).await;

    let tx = client.get(hash).await.expect("entity exists");
    assert_eq!(tx.status(), TxStatus::Confirmed { block: 5 });
    assert_eq!(tracker.tracked_count(), 0, "chain should have ended");
    assert!(calls.load(Ordering::SeqCst) >= 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_not_found_is_terminal() {
    let addr: SocketAddr = "127.0.0.1:29102".parse().unwrap();
    let hash = TxHash::repeat_byte(2);

    let calls = Arc::new(AtomicU32::new(0));
    let seen = calls.clone();
    common::start_mock_node(addr, move |_, _| {
        let seen = seen.clone();
        async move {
            seen.fetch_add(1, Ordering::SeqCst);
            Some(json!(null))
        }
    })
    .await;

    let shutdown = Shutdown::new();
    let (client, _hub) = common::spawn_hub(TxStore::new(), None, &shutdown);
    let tracker = tracker_for(addr, client.clone());

    client
        .apply(TxOp::Add {
            transaction: TrackedTx::new(hash),
            network: "main".to_string(),
        })
        .await;
    tracker.track(hash);

    tokio::time::sleep(Duration::from_millis(300)).await;

    let tx = client.get(hash).await.expect("entity exists");
    assert_eq!(tx.status(), TxStatus::Errored);
    assert_eq!(tx.error.as_deref(), Some(NOT_FOUND_ERROR));
    assert_eq!(tracker.tracked_count(), 0);
    // Terminal: exactly one lookup, never retried.
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_transport_failures_retry_until_confirmed() {
    let addr: SocketAddr = "127.0.0.1:29103".parse().unwrap();
    let hash = TxHash::repeat_byte(3);

    let calls = Arc::new(AtomicU32::new(0));
    let seen = calls.clone();
    common::start_mock_node(addr, move |_, _| {
        let seen = seen.clone();
        async move {
            let call = seen.fetch_add(1, Ordering::SeqCst);
            if call < 2 {
                // Connection dropped without a response.
                None
            } else {
                Some(confirmed_result(hash, "0x7"))
            }
        }
    })
    .await;

    let shutdown = Shutdown::new();
    let (client, _hub) = common::spawn_hub(TxStore::new(), None, &shutdown);
    let tracker = tracker_for(addr, client.clone());

    client
        .apply(TxOp::Add {
            transaction: TrackedTx::new(hash),
            network: "main".to_string(),
        })
        .await;
    tracker.track(hash);

    wait_for(|| calls.load(Ordering::SeqCst) >= 3).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let tx = client.get(hash).await.expect("entity exists");
    assert_eq!(tx.status(), TxStatus::Confirmed { block: 7 });

    shutdown.trigger();
}

#[tokio::test]
async fn test_abandon_terminates_chain() {
    let addr: SocketAddr = "127.0.0.1:29104".parse().unwrap();
    let hash = TxHash::repeat_byte(4);

    common::start_mock_node(addr, move |_, _| async move {
        Some(pending_result(TxHash::repeat_byte(4)))
    })
    .await;

    let shutdown = Shutdown::new();
    let (client, _hub) = common::spawn_hub(TxStore::new(), None, &shutdown);
    let tracker = tracker_for(addr, client.clone());

    client
        .apply(TxOp::Add {
            transaction: TrackedTx::new(hash),
            network: "main".to_string(),
        })
        .await;
    tracker.track(hash);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(tracker.tracked_count(), 1);

    assert!(tracker.abandon(&hash));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(tracker.tracked_count(), 0);
    let tx = client.get(hash).await.expect("entity exists");
    assert!(tx.is_pending(), "abandoned chain leaves the entity pending");
    assert!(!tracker.abandon(&hash), "nothing left to abandon");

    shutdown.trigger();
}

#[tokio::test]
async fn test_track_is_deduplicated_per_hash() {
    let addr: SocketAddr = "127.0.0.1:29105".parse().unwrap();
    let hash = TxHash::repeat_byte(5);

    common::start_mock_node(addr, move |_, _| async move {
        Some(pending_result(TxHash::repeat_byte(5)))
    })
    .await;

    let shutdown = Shutdown::new();
    let (client, _hub) = common::spawn_hub(TxStore::new(), None, &shutdown);
    let tracker = tracker_for(addr, client.clone());

    tracker.track(hash);
    tracker.track(hash);
    tracker.track(hash);
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(tracker.tracked_count(), 1);

    tracker.abandon(&hash);
    shutdown.trigger();
}

#[tokio::test]
async fn test_readiness_gate_holds_lookups_back() {
    let addr: SocketAddr = "127.0.0.1:29106".parse().unwrap();
    let hash = TxHash::repeat_byte(6);

    let height_calls = Arc::new(AtomicU32::new(0));
    let lookups = Arc::new(AtomicU32::new(0));
    let heights = height_calls.clone();
    let seen_lookups = lookups.clone();
    common::start_mock_node(addr, move |method, _| {
        let heights = heights.clone();
        let seen_lookups = seen_lookups.clone();
        async move {
            match method.as_str() {
                "eth_blockNumber" => {
                    let call = heights.fetch_add(1, Ordering::SeqCst);
                    if call < 3 {
                        // 500: below the gate, no lookups yet.
                        Some(json!("0x1f4"))
                    } else {
                        // 1001: gate opens.
                        Some(json!("0x3e9"))
                    }
                }
                "eth_getTransactionByHash" => {
                    seen_lookups.fetch_add(1, Ordering::SeqCst);
                    Some(confirmed_result(TxHash::repeat_byte(6), "0x9"))
                }
                _ => Some(json!(null)),
            }
        }
    })
    .await;

    let shutdown = Shutdown::new();
    let (client, _hub) = common::spawn_hub(TxStore::new(), None, &shutdown);
    let tracker = tracker_for(addr, client.clone());

    client
        .apply(TxOp::Add {
            transaction: TrackedTx::new(hash),
            network: "main".to_string(),
        })
        .await;

    let readiness = tokio::spawn({
        let tracker = tracker.clone();
        async move { tracker.await_node_readiness().await }
    });

    // While heights stay below the gate nothing is looked up.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(lookups.load(Ordering::SeqCst), 0);

    readiness.await.unwrap();
    wait_for(|| lookups.load(Ordering::SeqCst) >= 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let tx = client.get(hash).await.expect("entity exists");
    assert_eq!(tx.status(), TxStatus::Confirmed { block: 9 });

    shutdown.trigger();
}

#[tokio::test]
async fn test_reconcile_polls_only_pending_hashes() {
    let addr: SocketAddr = "127.0.0.1:29107".parse().unwrap();
    let confirmed = TxHash::repeat_byte(7);
    let pending = TxHash::repeat_byte(8);
    let errored = TxHash::repeat_byte(9);
    let other_network = TxHash::repeat_byte(10);

    let looked_up = Arc::new(Mutex::new(Vec::<String>::new()));
    let seen = looked_up.clone();
    common::start_mock_node(addr, move |method, params| {
        let seen = seen.clone();
        async move {
            if method == "eth_getTransactionByHash" {
                let requested = params
                    .get(0)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                seen.lock().unwrap().push(requested.clone());
                return Some(json!({ "hash": requested, "blockNumber": "0xb" }));
            }
            Some(json!(null))
        }
    })
    .await;

    let mut initial = TxStore::new();
    initial.add(TrackedTx::new(confirmed), "main");
    initial.merge(
        confirmed,
        &TxUpdate::from_fields(
            json!({ "blockNumber": "0x5" })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        ),
    );
    initial.add(TrackedTx::new(pending), "main");
    initial.add(TrackedTx::new(errored), "main");
    initial.merge(errored, &TxUpdate::not_found());
    initial.add(TrackedTx::new(other_network), "testnet");

    let shutdown = Shutdown::new();
    let (client, _hub) = common::spawn_hub(initial, None, &shutdown);
    let tracker = tracker_for(addr, client.clone());

    tracker.reconcile("main").await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let lookups = looked_up.lock().unwrap().clone();
    let expected = serde_json::to_value(pending)
        .unwrap()
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(lookups, vec![expected]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_network_change_cancellation_policy() {
    let addr: SocketAddr = "127.0.0.1:29108".parse().unwrap();
    let hash = TxHash::repeat_byte(11);

    common::start_mock_node(addr, move |_, _| async move {
        Some(pending_result(TxHash::repeat_byte(11)))
    })
    .await;

    let shutdown = Shutdown::new();
    let (client, _hub) = common::spawn_hub(TxStore::new(), None, &shutdown);

    let node = NodeClient::new(common::node_config(addr)).unwrap();
    let network = Arc::new(ActiveNetwork::new("main"));
    let mut config = common::fast_tracker_config();
    config.cancel_on_network_change = true;
    let tracker = Tracker::new(client.clone(), node, network.clone(), config);

    client
        .apply(TxOp::Add {
            transaction: TrackedTx::new(hash),
            network: "main".to_string(),
        })
        .await;
    tracker.track(hash);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(tracker.tracked_count(), 1);

    tracker.set_active_network("testnet").await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(network.current().as_str(), "testnet");
    assert_eq!(
        tracker.tracked_count(),
        0,
        "policy cancels the main-network chain"
    );

    shutdown.trigger();
}
