//! Transaction lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! readiness.rs (chain heights gate)
//!     → controller.rs reconcile (pending hashes on the active network)
//!     → one polling chain per hash:
//!           lookup → failed?          retry after flat interval
//!                  → no result?       merge terminal error, stop
//!                  → still pending?   re-schedule after flat interval
//!                  → confirmed?       stop
//! ```
//!
//! # Design Decisions
//! - Each chain owns an explicit cancellation handle; abandon() terminates
//!   a chain deterministically
//! - Behavior on network change is a configured policy, not a guess

pub mod controller;
pub mod readiness;

pub use controller::{Tracker, TrackerConfig};
pub use readiness::is_ready;
