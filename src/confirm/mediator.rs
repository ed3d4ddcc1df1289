//! The user-confirmation flow for outgoing transactions.
//!
//! # Responsibilities
//! - Reject batch positions and malformed payloads before any UI appears
//! - Open exactly one confirmation surface per request and await a single,
//!   correlated decision
//! - Register approved transactions and hand them to the tracker
//!
//! State machine per request: validation → awaiting user decision →
//! approved or denied. The outcome resolves exactly once.

use std::sync::Arc;
use uuid::Uuid;

use crate::confirm::surface::{
    AckRouter, Acknowledgment, SurfaceHandle, SurfaceKind, SurfaceSignal, WindowManager,
};
use crate::confirm::types::{ConfirmError, ConfirmResult, SendRequest};
use crate::confirm::validate;
use crate::node::ActiveNetwork;
use crate::observability::metrics;
use crate::replica::HubClient;
use crate::store::{TrackedTx, TxOp};
use crate::tracker::Tracker;
use alloy::primitives::TxHash;
use tokio::sync::oneshot;

/// Mediates every outgoing transaction through an explicit user decision.
#[derive(Clone)]
pub struct ConfirmationMediator {
    windows: WindowManager,
    acks: AckRouter,
    hub: HubClient,
    tracker: Tracker,
    network: Arc<ActiveNetwork>,
}

impl ConfirmationMediator {
    pub fn new(
        windows: WindowManager,
        acks: AckRouter,
        hub: HubClient,
        tracker: Tracker,
        network: Arc<ActiveNetwork>,
    ) -> Self {
        Self {
            windows,
            acks,
            hub,
            tracker,
            network,
        }
    }

    /// Run one send request through validation, the confirmation surface,
    /// and the one-shot decision.
    pub async fn confirm(&self, request: SendRequest) -> ConfirmResult<TxHash> {
        if request.part_of_batch {
            metrics::record_confirmation_outcome("batch_denied");
            return Err(ConfirmError::BatchDenied);
        }

        let payload = match validate::sanitize_payload(&request.params) {
            Ok(payload) => payload,
            Err(e) => {
                metrics::record_confirmation_outcome("invalid_payload");
                return Err(e);
            }
        };

        let request_id = Uuid::new_v4();
        let mut surface = self
            .windows
            .open(SurfaceKind::SendConfirmation, request_id, payload);
        let decision = self.acks.register(request_id, surface.window_id());
        self.windows.engage_overlay();
        tracing::info!(
            %request_id,
            window_id = surface.window_id(),
            "Awaiting user decision"
        );

        let outcome = self.await_decision(&mut surface, decision).await;

        self.windows.release_overlay();
        self.acks.unregister(&request_id);

        match outcome {
            Ok(hash) => {
                tracing::info!(%request_id, %hash, "Transaction approved and sent");
                metrics::record_confirmation_outcome("approved");
                self.register(hash).await;
                Ok(hash)
            }
            Err(e) => {
                tracing::debug!(%request_id, error = %e, "Confirmation did not complete");
                metrics::record_confirmation_outcome("denied");
                surface.close();
                Err(e)
            }
        }
    }

    /// Wait for the first decision naming this request and its owning
    /// window, or for the surface to go away undecided.
    async fn await_decision(
        &self,
        surface: &mut SurfaceHandle,
        mut decision: oneshot::Receiver<Acknowledgment>,
    ) -> ConfirmResult<TxHash> {
        loop {
            tokio::select! {
                ack = &mut decision => {
                    let Ok(ack) = ack else {
                        return Err(ConfirmError::Denied);
                    };
                    surface.mark_processed();
                    surface.close();
                    return match (ack.hash, ack.error) {
                        (Some(hash), None) => Ok(hash),
                        (_, Some(error)) => Err(ConfirmError::Failed(error)),
                        (None, None) => Err(ConfirmError::Denied),
                    };
                }
                signal = surface.next_signal() => {
                    match signal {
                        Some(SurfaceSignal::Hidden) | Some(SurfaceSignal::Closed) | None => {
                            // User cancelled?
                            if !surface.is_processed() {
                                return Err(ConfirmError::Denied);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Register the approved transaction under the active network and start
    /// polling for its confirmation.
    async fn register(&self, hash: TxHash) {
        let network = self.network.current();
        let transaction = TrackedTx::new(hash);
        let track = transaction.is_pending();
        self.hub
            .apply(TxOp::Add {
                transaction,
                network: network.as_str().to_string(),
            })
            .await;
        if track {
            self.tracker.track(hash);
        }
    }
}
