//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the hub.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the wallet hub.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HubConfig {
    /// Node endpoints and the active network.
    pub node: NodeConfig,

    /// Confirmation polling settings.
    pub tracker: TrackerConfig,

    /// Durable state storage.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Node endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint of the local node.
    pub rpc_url: String,

    /// Optional remote fallback endpoint (hosted RPC).
    pub remote_rpc_url: Option<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Network the wallet starts on (e.g. "main").
    pub network: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            remote_rpc_url: None,
            rpc_timeout_secs: 10,
            network: "main".to_string(),
        }
    }
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Flat interval between lookups and readiness probes, in milliseconds.
    pub poll_interval_ms: u64,

    /// Chain height either endpoint must exceed before reconciliation runs.
    pub ready_height: u64,

    /// Cancel running polling chains when the active network changes.
    pub cancel_on_network_change: bool,
}

impl TrackerConfig {
    /// The flat poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            ready_height: 1000,
            cancel_on_network_change: false,
        }
    }
}

/// Durable storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Persist transaction state across restarts.
    pub enabled: bool,

    /// Path of the state file.
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "wallet-hub-state.json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.tracker.poll_interval_ms, 2000);
        assert_eq!(config.tracker.ready_height, 1000);
        assert!(!config.tracker.cancel_on_network_change);
        assert_eq!(config.node.network, "main");
        assert!(config.storage.enabled);
    }

    #[test]
    fn test_minimal_toml_fills_defaults() {
        let config: HubConfig = toml::from_str(
            r#"
            [node]
            rpc_url = "http://127.0.0.1:9545"
            "#,
        )
        .unwrap();
        assert_eq!(config.node.rpc_url, "http://127.0.0.1:9545");
        assert_eq!(config.node.rpc_timeout_secs, 10);
        assert_eq!(config.tracker.poll_interval_ms, 2000);
    }

    #[test]
    fn test_poll_interval_duration() {
        let tracker = TrackerConfig {
            poll_interval_ms: 50,
            ..TrackerConfig::default()
        };
        assert_eq!(tracker.poll_interval(), Duration::from_millis(50));
    }
}
