//! Display-context projections of the authoritative store.

use tokio::sync::broadcast::{self, error::RecvError};

use crate::replica::hub::HubClient;
use crate::store::{TxOp, TxStore};

/// A read-mostly replica held by one display context.
///
/// The projection never mutates its own state directly: local actions are
/// dispatched to the hub, applied there, and come back through the same
/// broadcast stream every other context sees.
#[derive(Debug)]
pub struct Projection {
    state: TxStore,
    ops: broadcast::Receiver<TxOp>,
    hub: HubClient,
}

impl Projection {
    /// Attach to the hub: snapshot first, deltas after. `None` when the hub
    /// is gone.
    pub async fn attach(hub: HubClient) -> Option<Self> {
        let attachment = hub.attach().await?;
        Some(Self {
            state: attachment.snapshot,
            ops: attachment.ops,
            hub,
        })
    }

    /// The replicated state as of the last received operation.
    pub fn state(&self) -> &TxStore {
        &self.state
    }

    /// Forward a context-originated action to the authoritative location.
    /// The mutation becomes visible here only once it is re-broadcast.
    pub fn dispatch(&self, op: TxOp) {
        self.hub.dispatch(op);
    }

    /// Wait for the next committed operation and apply it. A lagged stream
    /// re-attaches for a fresh snapshot instead of replaying a gapped
    /// history. Returns `None` when the hub is gone.
    pub async fn recv(&mut self) -> Option<TxOp> {
        loop {
            match self.ops.recv().await {
                Ok(op) => {
                    op.apply(&mut self.state);
                    return Some(op);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Projection lagged behind hub, resyncing");
                    if !self.resync().await {
                        return None;
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Replace local state with a fresh snapshot and subscription.
    pub async fn resync(&mut self) -> bool {
        match self.hub.attach().await {
            Some(attachment) => {
                self.state = attachment.snapshot;
                self.ops = attachment.ops;
                true
            }
            None => false,
        }
    }
}
