//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Restore state → Spawn hub → Readiness gate
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C → broadcast signal → hub persists and closes storage → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then storage, then the hub, then polling
//! - Shutdown is a broadcast every long-running task can subscribe to

pub mod shutdown;

pub use shutdown::Shutdown;
