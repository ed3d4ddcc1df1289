//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use wallet_hub::config::{NodeConfig, TrackerConfig};
use wallet_hub::lifecycle::Shutdown;
use wallet_hub::replica::{HubClient, StoreHub};
use wallet_hub::storage::KvStore;
use wallet_hub::store::TxStore;

/// Start a mock JSON-RPC node. The handler receives (method, params) and
/// returns the JSON-RPC `result` value; `None` drops the connection without
/// a response, simulating a transport failure.
#[allow(dead_code)]
pub async fn start_mock_node<F, Fut>(addr: SocketAddr, handler: F)
where
    F: Fn(String, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Value>> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_json_request(&mut socket).await else {
                            return;
                        };
                        let method = request
                            .get("method")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string();
                        let params = request.get("params").cloned().unwrap_or(Value::Null);
                        let id = request.get("id").cloned().unwrap_or(Value::Null);

                        match handler(method, params).await {
                            Some(result) => {
                                let body =
                                    json!({ "jsonrpc": "2.0", "id": id, "result": result })
                                        .to_string();
                                let response = format!(
                                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                    body.len(),
                                    body
                                );
                                let _ = socket.write_all(response.as_bytes()).await;
                                let _ = socket.shutdown().await;
                            }
                            // Drop the socket mid-request: transport failure.
                            None => drop(socket),
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Read one HTTP request off the socket and parse its JSON body.
#[allow(dead_code)]
async fn read_json_request(socket: &mut TcpStream) -> Option<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(body_start) = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
        else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..body_start]);
        let content_length = headers
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        if buf.len() >= body_start + content_length {
            return serde_json::from_slice(&buf[body_start..body_start + content_length]).ok();
        }
    }
}

/// Node config pointed at a mock node, with a short timeout.
#[allow(dead_code)]
pub fn node_config(addr: SocketAddr) -> NodeConfig {
    NodeConfig {
        rpc_url: format!("http://{}", addr),
        remote_rpc_url: None,
        rpc_timeout_secs: 1,
        network: "main".to_string(),
    }
}

/// Tracker config with a short flat interval so tests converge quickly.
#[allow(dead_code)]
pub fn fast_tracker_config() -> TrackerConfig {
    TrackerConfig {
        poll_interval_ms: 25,
        ready_height: 1000,
        cancel_on_network_change: false,
    }
}

/// Spawn a hub task, returning its client and join handle.
#[allow(dead_code)]
pub fn spawn_hub(
    initial: TxStore,
    storage: Option<KvStore>,
    shutdown: &Shutdown,
) -> (HubClient, tokio::task::JoinHandle<()>) {
    let (hub, client) = StoreHub::new(initial, storage, shutdown.subscribe());
    let handle = tokio::spawn(hub.run());
    (client, handle)
}
