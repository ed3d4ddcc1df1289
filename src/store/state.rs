//! Transaction entity table and network-scoped index.
//!
//! # Responsibilities
//! - Hold every tracked transaction keyed by hash
//! - Keep a per-network, insertion-ordered index of hashes
//! - Merge node-supplied lookup results field-by-field (last write wins)
//!
//! No operation here fails: merging an unknown hash materializes the entity,
//! removing an unknown hash is a no-op.

use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Terminal error recorded when the node reports no such transaction.
pub const NOT_FOUND_ERROR: &str = "Transaction not found";

/// Completion state of a tracked transaction. A transaction is exactly one of
/// these at any time; a set block number means confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// No block number and no error yet.
    Pending,
    /// Mined into the given block.
    Confirmed { block: u64 },
    /// Lookup ended with a terminal error.
    Errored,
}

impl TxStatus {
    /// Check if polling for this transaction can stop.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxStatus::Pending => write!(f, "pending"),
            TxStatus::Confirmed { block } => write!(f, "confirmed in block {}", block),
            TxStatus::Errored => write!(f, "errored"),
        }
    }
}

/// A transaction tracked by the wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedTx {
    /// Unique transaction hash.
    pub hash: TxHash,
    /// Node-supplied fields from the latest lookup, merged last-write-wins.
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Block the transaction was mined in. Presence means confirmed.
    pub block_number: Option<u64>,
    /// Terminal lookup error, e.g. the node never heard of this hash.
    pub error: Option<String>,
}

impl TrackedTx {
    /// Create a fresh pending entity for a just-sent transaction.
    pub fn new(hash: TxHash) -> Self {
        Self {
            hash,
            fields: Map::new(),
            block_number: None,
            error: None,
        }
    }

    /// Current completion state. A block number wins over a stale error.
    pub fn status(&self) -> TxStatus {
        if let Some(block) = self.block_number {
            TxStatus::Confirmed { block }
        } else if self.error.is_some() {
            TxStatus::Errored
        } else {
            TxStatus::Pending
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status() == TxStatus::Pending
    }

    /// Shallow-merge an update into this entity, overwriting supplied fields
    /// and recomputing the block number from the node's `blockNumber` field.
    pub fn merge(&mut self, update: &TxUpdate) {
        for (key, value) in &update.fields {
            self.fields.insert(key.clone(), value.clone());
        }
        if let Some(value) = self.fields.get("blockNumber") {
            self.block_number = parse_quantity(value);
        }
        if let Some(error) = &update.error {
            self.error = Some(error.clone());
        }
    }
}

/// A shallow patch of node-supplied fields plus an optional terminal error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxUpdate {
    #[serde(default)]
    pub fields: Map<String, Value>,
    pub error: Option<String>,
}

impl TxUpdate {
    /// Patch built from a successful node lookup result.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            error: None,
        }
    }

    /// Terminal patch for a lookup the node answered with no result.
    pub fn not_found() -> Self {
        Self {
            fields: Map::new(),
            error: Some(NOT_FOUND_ERROR.to_string()),
        }
    }
}

/// Parse a JSON-RPC quantity (`"0x5"`) or plain number into a block number.
pub(crate) fn parse_quantity(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => {
            let digits = s.strip_prefix("0x").unwrap_or(s);
            u64::from_str_radix(digits, 16).ok()
        }
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// The authoritative transaction store: entity table plus network index.
///
/// Mutated only on the hub's single loop, so interior locking is unnecessary;
/// display contexts hold replicated clones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxStore {
    entries: HashMap<TxHash, TrackedTx>,
    by_network: HashMap<String, Vec<TxHash>>,
}

impl TxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entity and append its hash to the network
    /// sequence, only if not already present there.
    pub fn add(&mut self, transaction: TrackedTx, network: &str) {
        let hash = transaction.hash;
        self.entries.insert(hash, transaction);
        let sequence = self.by_network.entry(network.to_string()).or_default();
        if !sequence.contains(&hash) {
            sequence.push(hash);
        }
    }

    /// Shallow-merge an update into the entity, creating it if absent.
    /// Returns the merged entity.
    pub fn merge(&mut self, hash: TxHash, update: &TxUpdate) -> &TrackedTx {
        let entry = self
            .entries
            .entry(hash)
            .or_insert_with(|| TrackedTx::new(hash));
        entry.merge(update);
        entry
    }

    /// Delete the entity and purge the hash from every network sequence.
    /// Unknown hashes are a no-op.
    pub fn remove(&mut self, hash: TxHash) {
        self.entries.remove(&hash);
        self.by_network.retain(|_, sequence| {
            sequence.retain(|h| *h != hash);
            !sequence.is_empty()
        });
    }

    pub fn get(&self, hash: &TxHash) -> Option<&TrackedTx> {
        self.entries.get(hash)
    }

    /// Hashes registered under a network, in insertion order.
    pub fn hashes_for(&self, network: &str) -> &[TxHash] {
        self.by_network
            .get(network)
            .map(|sequence| sequence.as_slice())
            .unwrap_or(&[])
    }

    /// Hashes on a network whose entity is still pending, in insertion order.
    pub fn pending_on(&self, network: &str) -> Vec<TxHash> {
        self.hashes_for(network)
            .iter()
            .filter(|hash| self.get(hash).map(TrackedTx::is_pending).unwrap_or(false))
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
