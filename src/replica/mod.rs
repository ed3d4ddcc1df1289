//! Cross-process replication subsystem.
//!
//! # Data Flow
//! ```text
//! confirm / tracker / display contexts
//!     → HubClient (mpsc inbox, strict arrival order)
//!     → StoreHub (apply → persist → broadcast)
//!     → Projection per display context (snapshot, then deltas)
//!
//! Context-originated actions:
//!     Projection::dispatch → hub applies → re-broadcast to ALL contexts,
//!     including the originator. Never context-to-context.
//! ```
//!
//! # Design Decisions
//! - One owner: the canonical store lives behind a single serializing task
//! - Attach is an inbox command, so a snapshot always precedes the deltas
//!   committed after it; late attachers never observe partial history
//! - Replication is a publish step after local commit, never a shared write

pub mod hub;
pub mod projection;

pub use hub::{Attachment, HubClient, HubCommand, StoreHub, STATE_KEY};
pub use projection::Projection;
