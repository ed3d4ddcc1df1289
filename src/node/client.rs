//! JSON-RPC node client with timeout and fallback handling.
//!
//! # Responsibilities
//! - Issue opaque `call(method, params)` requests against the local node
//! - Fall back to the remote endpoint when the local one is unreachable
//! - Report chain heights for the readiness gate
//!
//! The node is an opaque collaborator: a call succeeds, returns no result,
//! or fails transiently. Callers decide what to do with each outcome.

use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::node::types::{ChainHeights, NodeConfig, NodeError, NodeResult};
use crate::store::state::parse_quantity;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Node RPC client: local endpoint first, remote fallback second.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    /// Endpoints in priority order (local, then remote if configured).
    endpoints: Vec<url::Url>,
    next_id: Arc<AtomicU64>,
    config: NodeConfig,
}

impl NodeClient {
    /// Create a new node client from configuration.
    pub fn new(config: NodeConfig) -> NodeResult<Self> {
        let mut endpoints = Vec::new();

        let local: url::Url = config
            .rpc_url
            .parse()
            .map_err(|_| NodeError::InvalidUrl(config.rpc_url.clone()))?;
        endpoints.push(local);

        if let Some(remote) = &config.remote_rpc_url {
            match remote.parse() {
                Ok(url) => endpoints.push(url),
                Err(_) => {
                    tracing::warn!(url = %remote, "Ignoring invalid remote RPC URL");
                }
            }
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.rpc_timeout_secs))
            .build()
            .map_err(|e| NodeError::Unreachable(e.to_string()))?;

        tracing::info!(
            rpc_url = %config.rpc_url,
            remote = config.remote_rpc_url.is_some(),
            timeout_secs = config.rpc_timeout_secs,
            "Node client initialized"
        );

        Ok(Self {
            http,
            endpoints,
            next_id: Arc::new(AtomicU64::new(1)),
            config,
        })
    }

    /// Issue an opaque JSON-RPC call, trying each endpoint in order.
    ///
    /// A JSON-RPC error object ends the call immediately: the node answered,
    /// so the fallback would only repeat the rejection.
    pub async fn call(&self, method: &str, params: Value) -> NodeResult<Value> {
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            match self.call_at(endpoint, method, params.clone()).await {
                Ok(result) => return Ok(result),
                Err(rejected @ NodeError::Rejected { .. }) => return Err(rejected),
                Err(e) => {
                    tracing::warn!(endpoint_idx = i, method, error = %e, "Node call failed");
                }
            }
        }
        Err(NodeError::Unreachable(
            "all node endpoints failed".to_string(),
        ))
    }

    async fn call_at(&self, endpoint: &url::Url, method: &str, params: Value) -> NodeResult<Value> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| NodeError::Unreachable(e.to_string()))?;

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| NodeError::Unreachable(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(NodeError::Rejected {
                code: error.code,
                message: error.message,
            });
        }
        Ok(body.result.unwrap_or(Value::Null))
    }

    /// Look up a transaction by hash. `Ok(None)` means the node has no record
    /// of it.
    pub async fn transaction_by_hash(&self, hash: TxHash) -> NodeResult<Option<Map<String, Value>>> {
        match self.call("eth_getTransactionByHash", json!([hash])).await? {
            Value::Null => Ok(None),
            Value::Object(fields) => Ok(Some(fields)),
            other => {
                tracing::warn!(%hash, result = %other, "Unexpected lookup result shape");
                Ok(None)
            }
        }
    }

    /// Latest block number of the local node.
    pub async fn block_number(&self) -> NodeResult<u64> {
        self.block_number_at(0).await
    }

    async fn block_number_at(&self, endpoint_idx: usize) -> NodeResult<u64> {
        let endpoint = self
            .endpoints
            .get(endpoint_idx)
            .ok_or_else(|| NodeError::Unreachable("no such endpoint".to_string()))?;
        let result = self.call_at(endpoint, "eth_blockNumber", json!([])).await?;
        parse_quantity(&result)
            .ok_or_else(|| NodeError::Unreachable(format!("bad block number: {}", result)))
    }

    /// Heights of both endpoints for the readiness gate. Unreachable
    /// endpoints report zero.
    pub async fn chain_heights(&self) -> ChainHeights {
        let local = self.block_number_at(0).await.unwrap_or(0);
        let remote = if self.endpoints.len() > 1 {
            self.block_number_at(1).await.unwrap_or(0)
        } else {
            0
        };
        ChainHeights { local, remote }
    }

    /// Get the configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("remote_rpc_url", &self.config.remote_rpc_url)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
