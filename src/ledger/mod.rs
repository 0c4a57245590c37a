//! Ledger abstraction for on-chain asset operations.
//!
//! The remote ledger is modeled as an opaque asynchronous service exposing
//! mint, burn, and query operations. Implementations bound their own
//! worst-case latency and surface a failure rather than hang, so callers
//! can always demote a failed call to an offline fallback.
//!
//! - `address`: raw secret to checksummed wallet address derivation
//! - `http_client`: JSON-RPC adapter for the asset ledger gateway
//! - `mock`: programmable in-memory ledger for tests

pub mod address;
pub mod http_client;
#[cfg(test)]
pub mod mock;

pub use http_client::HttpLedgerClient;

use serde::{Deserialize, Serialize};

/// Asset categories tracked on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// A named in-game rank held by a wallet.
    Rank,
    /// A single stored inventory item held by a wallet.
    Item,
}

impl AssetKind {
    /// Wire name used by the ledger gateway.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Rank => "rank",
            AssetKind::Item => "item",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single asset held by a wallet, as reported by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerAsset {
    /// The asset category.
    #[serde(rename = "assetType")]
    pub kind: AssetKind,
    /// Opaque asset value: a rank name or an item type identifier.
    pub value: String,
}

/// Errors surfaced by ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger could not be reached (network failure or timeout).
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger actively refused the call (e.g. a contract-level
    /// rejection of a malformed address).
    #[error("ledger rejected call: {0}")]
    Rejected(String),
}

/// Asynchronous client for the remote asset ledger.
///
/// Each operation makes exactly one attempt; retry policy belongs to the
/// reconciliation layer, not the client.
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
    /// Request creation of an on-chain asset for the wallet.
    ///
    /// Callers are responsible for not minting when an asset of this kind
    /// already exists for the wallet.
    async fn mint(&self, wallet: &str, kind: AssetKind, value: &str) -> Result<(), LedgerError>;

    /// Request destruction of the wallet's asset of the given kind.
    ///
    /// Resolves the ledger-side token identifier first; a wallet without
    /// such an asset is a no-op success, not an error.
    async fn burn(&self, wallet: &str, kind: AssetKind) -> Result<(), LedgerError>;

    /// Fetch all assets currently on-chain for a wallet.
    async fn query_wallet_assets(&self, wallet: &str) -> Result<Vec<LedgerAsset>, LedgerError>;
}
