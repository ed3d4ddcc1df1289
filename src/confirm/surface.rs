//! Confirmation surfaces and the one-shot acknowledgment channel.
//!
//! # Responsibilities
//! - Track every open confirmation surface and its processed flag
//! - Publish opened surfaces to the shell that renders real windows
//! - Route decision messages to the single pending wait they correlate with
//!
//! # Design Decisions
//! - Decisions are matched by an explicit request id issued at creation,
//!   plus the id of the owning window; mismatched window ids are ignored
//!   without consuming the wait
//! - Only the first matching decision is consumed; the rest are dropped

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use uuid::Uuid;

use crate::confirm::validate::SanitizedPayload;
use alloy::primitives::TxHash;

/// Kinds of modal surface this subsystem can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    SendConfirmation,
}

/// Notification that a surface was opened, consumed by the rendering shell.
#[derive(Debug, Clone)]
pub struct OpenedSurface {
    pub window_id: u64,
    pub request_id: Uuid,
    pub kind: SurfaceKind,
    pub payload: SanitizedPayload,
}

/// Lifecycle signals a surface can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSignal {
    /// The window left the screen (dismissal, navigation).
    Hidden,
    /// The window is gone.
    Closed,
}

struct SurfaceEntry {
    signal_tx: mpsc::UnboundedSender<SurfaceSignal>,
    processed: Arc<AtomicBool>,
}

/// Owning handle for one open confirmation surface.
pub struct SurfaceHandle {
    window_id: u64,
    request_id: Uuid,
    signals: mpsc::UnboundedReceiver<SurfaceSignal>,
    processed: Arc<AtomicBool>,
    windows: WindowManager,
}

impl SurfaceHandle {
    pub fn window_id(&self) -> u64 {
        self.window_id
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Next lifecycle signal; `None` once the surface is gone.
    pub async fn next_signal(&mut self) -> Option<SurfaceSignal> {
        self.signals.recv().await
    }

    /// Record that a decision was consumed for this surface.
    pub fn mark_processed(&self) {
        self.processed.store(true, Ordering::SeqCst);
    }

    pub fn is_processed(&self) -> bool {
        self.processed.load(Ordering::SeqCst)
    }

    /// Close the underlying window.
    pub fn close(&self) {
        self.windows.close(self.window_id);
    }
}

/// In-process stand-in for the desktop window system: the narrow interface
/// this subsystem needs from it (create a modal, observe its lifecycle,
/// flip its processed flag, dim everything behind it).
#[derive(Clone)]
pub struct WindowManager {
    inner: Arc<WindowManagerInner>,
}

struct WindowManagerInner {
    next_id: AtomicU64,
    surfaces: DashMap<u64, SurfaceEntry>,
    opened: broadcast::Sender<OpenedSurface>,
    overlay: AtomicBool,
}

impl WindowManager {
    pub fn new() -> Self {
        let (opened, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(WindowManagerInner {
                next_id: AtomicU64::new(1),
                surfaces: DashMap::new(),
                opened,
                overlay: AtomicBool::new(false),
            }),
        }
    }

    /// Observe surfaces as they open (the rendering shell's side).
    pub fn subscribe_opened(&self) -> broadcast::Receiver<OpenedSurface> {
        self.inner.opened.subscribe()
    }

    /// Open a modal surface carrying a sanitized payload.
    pub fn open(
        &self,
        kind: SurfaceKind,
        request_id: Uuid,
        payload: SanitizedPayload,
    ) -> SurfaceHandle {
        let window_id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (signal_tx, signals) = mpsc::unbounded_channel();
        let processed = Arc::new(AtomicBool::new(false));
        self.inner.surfaces.insert(
            window_id,
            SurfaceEntry {
                signal_tx,
                processed: processed.clone(),
            },
        );
        let _ = self.inner.opened.send(OpenedSurface {
            window_id,
            request_id,
            kind,
            payload,
        });
        tracing::debug!(window_id, %request_id, "Confirmation surface opened");
        SurfaceHandle {
            window_id,
            request_id,
            signals,
            processed,
            windows: self.clone(),
        }
    }

    /// Deliver a lifecycle signal to the surface owning `window_id` (the
    /// shell's side). False when no such surface exists.
    pub fn signal(&self, window_id: u64, signal: SurfaceSignal) -> bool {
        match self.inner.surfaces.get(&window_id) {
            Some(entry) => entry.signal_tx.send(signal).is_ok(),
            None => false,
        }
    }

    /// Close a surface, emitting a final `Closed` signal to its handle.
    pub fn close(&self, window_id: u64) {
        if let Some((_, entry)) = self.inner.surfaces.remove(&window_id) {
            let _ = entry.signal_tx.send(SurfaceSignal::Closed);
        }
    }

    /// Processed flag of a window, if it is still open.
    pub fn is_processed(&self, window_id: u64) -> Option<bool> {
        self.inner
            .surfaces
            .get(&window_id)
            .map(|entry| entry.processed.load(Ordering::SeqCst))
    }

    pub fn open_count(&self) -> usize {
        self.inner.surfaces.len()
    }

    /// Dim every other interaction layer while a confirmation is up.
    pub fn engage_overlay(&self) {
        self.inner.overlay.store(true, Ordering::SeqCst);
    }

    pub fn release_overlay(&self) {
        self.inner.overlay.store(false, Ordering::SeqCst);
    }

    pub fn overlay_engaged(&self) -> bool {
        self.inner.overlay.load(Ordering::SeqCst)
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new()
    }
}

/// The decision message produced by a confirmation surface. Mirrors the
/// shell's callback shape: an error, a transaction hash, or neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgment {
    /// Id issued when the request was created; the correlation key.
    pub request_id: Uuid,
    /// Window claiming to own the request.
    pub window_id: u64,
    /// Hash of the sent transaction, when the user approved.
    pub hash: Option<TxHash>,
    /// Failure reported by the surface.
    pub error: Option<String>,
}

struct PendingDecision {
    window_id: u64,
    reply: oneshot::Sender<Acknowledgment>,
}

/// Routes acknowledgments to pending confirmation waits by request id.
#[derive(Clone)]
pub struct AckRouter {
    pending: Arc<DashMap<Uuid, PendingDecision>>,
}

impl AckRouter {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Register a wait for one decision, bound to the owning window.
    pub fn register(&self, request_id: Uuid, window_id: u64) -> oneshot::Receiver<Acknowledgment> {
        let (reply, rx) = oneshot::channel();
        self.pending
            .insert(request_id, PendingDecision { window_id, reply });
        rx
    }

    /// Deliver a decision. True when it was consumed by a pending wait;
    /// unknown ids and mismatched window ids are ignored.
    pub fn deliver(&self, ack: Acknowledgment) -> bool {
        {
            let Some(entry) = self.pending.get(&ack.request_id) else {
                tracing::debug!(request_id = %ack.request_id, "No pending wait for decision");
                return false;
            };
            if entry.window_id != ack.window_id {
                tracing::warn!(
                    request_id = %ack.request_id,
                    window_id = ack.window_id,
                    owner = entry.window_id,
                    "Decision from a window that does not own the request"
                );
                return false;
            }
        }
        match self.pending.remove(&ack.request_id) {
            Some((_, pending)) => pending.reply.send(ack).is_ok(),
            None => false,
        }
    }

    /// Drop a pending wait, e.g. once the request resolved by other means.
    pub fn unregister(&self, request_id: &Uuid) {
        self.pending.remove(request_id);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Default for AckRouter {
    fn default() -> Self {
        Self::new()
    }
}
