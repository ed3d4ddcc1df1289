//! Authoritative store hub.
//!
//! Exactly one hub task owns the canonical [`TxStore`]. Every mutation goes
//! through its inbox, executes locally, is persisted, and only then is
//! broadcast to the attached display contexts in commit order.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::observability::metrics;
use crate::storage::KvStore;
use crate::store::{TrackedTx, TxOp, TxStore};
use alloy::primitives::TxHash;

/// Storage key under which the transaction state survives restarts.
pub const STATE_KEY: &str = "transactions";

/// Broadcast backlog per attached context before it is considered lagged.
const OP_BACKLOG: usize = 256;

/// Commands accepted by the hub's inbox, processed strictly in arrival order.
#[derive(Debug)]
pub enum HubCommand {
    /// Apply a mutation; optionally report the committed entity back.
    Apply {
        op: TxOp,
        reply: Option<oneshot::Sender<Option<TrackedTx>>>,
    },
    /// Attach a display context: full snapshot first, then deltas.
    Attach { reply: oneshot::Sender<Attachment> },
    Get {
        hash: TxHash,
        reply: oneshot::Sender<Option<TrackedTx>>,
    },
    HashesFor {
        network: String,
        reply: oneshot::Sender<Vec<TxHash>>,
    },
    PendingOn {
        network: String,
        reply: oneshot::Sender<Vec<TxHash>>,
    },
}

/// What a freshly attached display context receives: the complete current
/// state, and a subscription that only carries operations committed after the
/// snapshot was taken.
#[derive(Debug)]
pub struct Attachment {
    pub snapshot: TxStore,
    pub ops: broadcast::Receiver<TxOp>,
}

/// The authoritative location. Runs as a single task; no locking needed.
pub struct StoreHub {
    store: TxStore,
    storage: Option<KvStore>,
    inbox: mpsc::UnboundedReceiver<HubCommand>,
    publish: broadcast::Sender<TxOp>,
    shutdown: broadcast::Receiver<()>,
}

impl StoreHub {
    /// Create a hub seeded with initial state, returning the client handle
    /// used by every other component.
    pub fn new(
        initial: TxStore,
        storage: Option<KvStore>,
        shutdown: broadcast::Receiver<()>,
    ) -> (Self, HubClient) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let (publish, _) = broadcast::channel(OP_BACKLOG);
        let hub = Self {
            store: initial,
            storage,
            inbox,
            publish,
            shutdown,
        };
        (hub, HubClient { tx })
    }

    /// Reload persisted transaction state, falling back to an empty store.
    pub fn restore(storage: &KvStore) -> TxStore {
        match storage.get(STATE_KEY) {
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(store) => store,
                Err(e) => {
                    tracing::warn!(error = %e, "Persisted transaction state unreadable, starting empty");
                    TxStore::new()
                }
            },
            None => TxStore::new(),
        }
    }

    /// Run the hub until every client is gone or shutdown is triggered.
    pub async fn run(mut self) {
        tracing::info!(transactions = self.store.len(), "Store hub running");
        loop {
            tokio::select! {
                maybe_cmd = self.inbox.recv() => match maybe_cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                _ = self.shutdown.recv() => {
                    tracing::info!("Store hub shutting down");
                    break;
                }
            }
        }
        self.persist();
        if let Some(storage) = self.storage.take() {
            if let Err(e) = storage.close() {
                tracing::warn!(error = %e, "Failed to close durable storage");
            }
        }
    }

    fn handle(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Apply { op, reply } => {
                let committed = self.commit(op);
                if let Some(reply) = reply {
                    let _ = reply.send(committed);
                }
            }
            HubCommand::Attach { reply } => {
                metrics::record_attachment();
                let _ = reply.send(Attachment {
                    snapshot: self.store.clone(),
                    ops: self.publish.subscribe(),
                });
            }
            HubCommand::Get { hash, reply } => {
                let _ = reply.send(self.store.get(&hash).cloned());
            }
            HubCommand::HashesFor { network, reply } => {
                let _ = reply.send(self.store.hashes_for(&network).to_vec());
            }
            HubCommand::PendingOn { network, reply } => {
                let _ = reply.send(self.store.pending_on(&network));
            }
        }
    }

    /// Apply locally, persist, then publish. Order matters: a context must
    /// never observe an operation the authoritative store has not committed.
    fn commit(&mut self, op: TxOp) -> Option<TrackedTx> {
        tracing::debug!(hash = %op.hash(), "Committing store operation");
        let committed = op.apply(&mut self.store);
        self.persist();
        let _ = self.publish.send(op);
        metrics::record_store_size(self.store.len());
        committed
    }

    fn persist(&mut self) {
        let Some(storage) = &mut self.storage else {
            return;
        };
        match serde_json::to_value(&self.store) {
            Ok(value) => {
                if let Err(e) = storage.set(STATE_KEY, value) {
                    tracing::warn!(error = %e, "Failed to persist transaction state");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize transaction state"),
        }
    }
}

/// Cheap-to-clone handle every component and display context uses to reach
/// the hub. Reads and writes resolve in hub arrival order.
#[derive(Debug, Clone)]
pub struct HubClient {
    tx: mpsc::UnboundedSender<HubCommand>,
}

impl HubClient {
    /// Apply a mutation and wait for the committed entity. Returns `None`
    /// after removals or when the hub is gone.
    pub async fn apply(&self, op: TxOp) -> Option<TrackedTx> {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(HubCommand::Apply {
                op,
                reply: Some(reply),
            })
            .is_err()
        {
            return None;
        }
        rx.await.unwrap_or(None)
    }

    /// Fire-and-forget mutation, used by display contexts dispatching actions.
    pub fn dispatch(&self, op: TxOp) {
        let _ = self.tx.send(HubCommand::Apply { op, reply: None });
    }

    /// Attach a display context. `None` when the hub is gone.
    pub async fn attach(&self) -> Option<Attachment> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(HubCommand::Attach { reply }).ok()?;
        rx.await.ok()
    }

    pub async fn get(&self, hash: TxHash) -> Option<TrackedTx> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(HubCommand::Get { hash, reply }).ok()?;
        rx.await.unwrap_or(None)
    }

    pub async fn hashes_for(&self, network: &str) -> Vec<TxHash> {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(HubCommand::HashesFor {
                network: network.to_string(),
                reply,
            })
            .is_err()
        {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Hashes still pending on a network, in registration order.
    pub async fn pending_on(&self, network: &str) -> Vec<TxHash> {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(HubCommand::PendingOn {
                network: network.to_string(),
                reply,
            })
            .is_err()
        {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }
}
