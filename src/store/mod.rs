//! Transaction store subsystem.
//!
//! # Data Flow
//! ```text
//! confirm (approved send)         tracker (lookup results)
//!     → TxOp::Add                     → TxOp::Merge
//!            \                       /
//!             state.rs (entity table + per-network ordered index)
//!                 → replica/hub.rs (commit, persist, broadcast)
//! ```
//!
//! # Design Decisions
//! - Operations never fail: unknown hashes materialize on merge, no-op on remove
//! - A hash appears at most once per network sequence
//! - Removal purges the entity and every index entry in one step

pub mod ops;
pub mod state;

pub use ops::TxOp;
pub use state::{TrackedTx, TxStatus, TxStore, TxUpdate, NOT_FOUND_ERROR};
