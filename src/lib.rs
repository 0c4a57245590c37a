//! Synchronization engine linking off-chain game state to an on-chain
//! asset ledger.
//!
//! Player state (rank, stored item) lives in two places: the
//! authoritative asset ledger and a local write-through cache that keeps
//! the game playable while the ledger is slow, unreachable, or
//! misconfigured. [`sync::AssetSyncEngine`] routes every read and write
//! between the two; [`sync::poller::ReconciliationPoller`] converges the
//! cache back onto the ledger after outages.

pub mod config;
pub mod ledger;
pub mod store;
pub mod sync;
