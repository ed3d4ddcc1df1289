//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the parsed config
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::HubConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid node RPC URL '{0}'")]
    InvalidRpcUrl(String),

    #[error("invalid remote RPC URL '{0}'")]
    InvalidRemoteUrl(String),

    #[error("tracker poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("tracker ready height must be greater than zero")]
    ZeroReadyHeight,

    #[error("active network name must not be empty")]
    EmptyNetwork,

    #[error("storage path must not be empty when storage is enabled")]
    EmptyStoragePath,

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Check the whole configuration, collecting every problem.
pub fn validate_config(config: &HubConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if url::Url::parse(&config.node.rpc_url).is_err() {
        errors.push(ValidationError::InvalidRpcUrl(config.node.rpc_url.clone()));
    }
    if let Some(remote) = &config.node.remote_rpc_url {
        if url::Url::parse(remote).is_err() {
            errors.push(ValidationError::InvalidRemoteUrl(remote.clone()));
        }
    }
    if config.node.network.trim().is_empty() {
        errors.push(ValidationError::EmptyNetwork);
    }
    if config.tracker.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }
    if config.tracker.ready_height == 0 {
        errors.push(ValidationError::ZeroReadyHeight);
    }
    if config.storage.enabled && config.storage.path.trim().is_empty() {
        errors.push(ValidationError::EmptyStoragePath);
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
