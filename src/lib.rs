//! Wallet Transaction Hub Library
//!
//! Tracks the blockchain transactions a user sends from a desktop wallet,
//! keeps their status consistent between the privileged hub process and every
//! display context, and mediates an explicit user confirmation before any
//! transaction leaves the machine.

pub mod config;
pub mod confirm;
pub mod lifecycle;
pub mod node;
pub mod observability;
pub mod replica;
pub mod storage;
pub mod store;
pub mod tracker;

pub use config::HubConfig;
pub use confirm::ConfirmationMediator;
pub use lifecycle::Shutdown;
pub use replica::{HubClient, Projection, StoreHub};
pub use tracker::Tracker;
