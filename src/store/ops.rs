//! Replicated store operations.

use crate::store::state::{TrackedTx, TxStore, TxUpdate};
use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};

/// A state-changing operation on the transaction store.
///
/// Every mutation executes on the authoritative hub first and is then
/// re-broadcast verbatim, in commit order, to every attached display context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TxOp {
    /// Register a transaction under a network.
    Add {
        transaction: TrackedTx,
        network: String,
    },
    /// Shallow-merge a lookup result into an entity.
    Merge { hash: TxHash, update: TxUpdate },
    /// Operator-initiated removal of an entity and its index entries.
    Remove { hash: TxHash },
}

impl TxOp {
    /// Hash of the entity this operation touches.
    pub fn hash(&self) -> TxHash {
        match self {
            TxOp::Add { transaction, .. } => transaction.hash,
            TxOp::Merge { hash, .. } => *hash,
            TxOp::Remove { hash } => *hash,
        }
    }

    /// Apply to a store, returning the entity as committed (None after a
    /// removal).
    pub fn apply(&self, store: &mut TxStore) -> Option<TrackedTx> {
        match self {
            TxOp::Add {
                transaction,
                network,
            } => {
                store.add(transaction.clone(), network);
                store.get(&transaction.hash).cloned()
            }
            TxOp::Merge { hash, update } => Some(store.merge(*hash, update).clone()),
            TxOp::Remove { hash } => {
                store.remove(*hash);
                None
            }
        }
    }
}
