//! Asset synchronization core.
//!
//! This module holds the components that keep the off-chain game state and
//! the on-chain asset ledger consistent while tolerating the ledger being
//! slow, unreachable, or misconfigured:
//!
//! - `engine`: the orchestrator routing every read and write between the
//!   ledger and the local cache
//! - `monitor`: ledger availability tracking fed by call outcomes
//! - `poller`: the periodic reconciliation task
//! - `side_effects`: best-effort permission-group hook for rank assets
//!
//! All asset traffic flows through the engine; the poller drives the same
//! engine API on a timer with no path of its own to the ledger or the
//! cache.

/// Orchestrator for ledger-backed asset state
pub mod engine;
/// Ledger availability tracking
pub mod monitor;
/// Periodic reconciliation task
pub mod poller;
/// Permission-group side effects for rank assets
pub mod side_effects;

pub use engine::*;
