//! Confirmation flow types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors a send request can resolve with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmError {
    /// Batches must never silently execute a value-moving operation; the
    /// whole batch position is denied.
    #[error("transactions inside a batch are denied")]
    BatchDenied,

    /// A payload field was not representable as a hexadecimal string.
    #[error("invalid send payload")]
    InvalidPayload,

    /// The user denied the transaction or dismissed the surface.
    #[error("transaction denied by user")]
    Denied,

    /// The confirmation surface reported a failure while sending.
    #[error("confirmation failed: {0}")]
    Failed(String),
}

/// Result type for confirmation operations.
pub type ConfirmResult<T> = Result<T, ConfirmError>;

/// An incoming send request, prior to validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendRequest {
    /// Raw transaction parameters from the caller (from, to, value, data, ...).
    pub params: Map<String, Value>,

    /// True when the request arrived inside a batched set of calls.
    #[serde(default)]
    pub part_of_batch: bool,
}
