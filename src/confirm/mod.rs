//! Confirmation subsystem.
//!
//! # Data Flow
//! ```text
//! send request
//!     → types.rs (batch position? denied outright)
//!     → validate.rs (pure parse: every field a normalized hex string)
//!     → surface.rs (one modal surface, overlay engaged, one-shot decision
//!       channel correlated by request id + owning window)
//!     → mediator.rs (await first matching decision, or denial on close)
//!     → store Add + tracker hand-off on approval
//! ```
//!
//! # Design Decisions
//! - Validation fails fast, before any surface exists
//! - A request resolves exactly once: approve and deny are mutually
//!   exclusive, each fires at most once
//! - Decisions are matched by explicit request id, not ambient sender
//!   identity

pub mod mediator;
pub mod surface;
pub mod types;
pub mod validate;

pub use mediator::ConfirmationMediator;
pub use surface::{AckRouter, Acknowledgment, OpenedSurface, SurfaceKind, SurfaceSignal, WindowManager};
pub use types::{ConfirmError, ConfirmResult, SendRequest};
pub use validate::{sanitize_payload, SanitizedPayload};
