//! Pure in-memory mock ledger for tests.

use super::{AssetKind, LedgerAsset, LedgerClient, LedgerError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Failure mode the mock can be switched into.
#[derive(Debug, Clone, Copy)]
pub enum LedgerFailure {
    /// Every call fails as a transport failure.
    Unavailable,
    /// Every call fails as a contract-level rejection.
    Rejected,
}

/// Programmable in-memory stand-in for the remote ledger.
///
/// Holds assets in a plain map, can be flipped into a failure mode at any
/// point, and counts every call made against it.
pub struct MockLedgerClient {
    assets: Mutex<HashMap<(String, AssetKind), String>>,
    failure: Mutex<Option<LedgerFailure>>,
    calls: AtomicUsize,
}

impl MockLedgerClient {
    pub fn new() -> Self {
        Self {
            assets: Mutex::new(HashMap::new()),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Switch the failure mode on or off.
    pub fn set_failure(&self, failure: Option<LedgerFailure>) {
        *self.failure.lock().unwrap() = failure;
    }

    /// Seed an asset directly, bypassing the call counter.
    pub fn insert_asset(&self, wallet: &str, kind: AssetKind, value: &str) {
        self.assets
            .lock()
            .unwrap()
            .insert((wallet.to_string(), kind), value.to_string());
    }

    /// Current on-ledger value for a (wallet, kind), if any.
    pub fn asset(&self, wallet: &str, kind: AssetKind) -> Option<String> {
        self.assets
            .lock()
            .unwrap()
            .get(&(wallet.to_string(), kind))
            .cloned()
    }

    /// Total number of ledger calls attempted, failures included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn gate(&self) -> Result<(), LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match *self.failure.lock().unwrap() {
            Some(LedgerFailure::Unavailable) => {
                Err(LedgerError::Unavailable("mock transport down".to_string()))
            }
            Some(LedgerFailure::Rejected) => {
                Err(LedgerError::Rejected("mock contract rejection".to_string()))
            }
            None => Ok(()),
        }
    }
}

impl Default for MockLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LedgerClient for MockLedgerClient {
    async fn mint(&self, wallet: &str, kind: AssetKind, value: &str) -> Result<(), LedgerError> {
        self.gate()?;
        self.assets
            .lock()
            .unwrap()
            .insert((wallet.to_string(), kind), value.to_string());
        Ok(())
    }

    async fn burn(&self, wallet: &str, kind: AssetKind) -> Result<(), LedgerError> {
        self.gate()?;
        // Burning a missing asset is a no-op success.
        self.assets.lock().unwrap().remove(&(wallet.to_string(), kind));
        Ok(())
    }

    async fn query_wallet_assets(&self, wallet: &str) -> Result<Vec<LedgerAsset>, LedgerError> {
        self.gate()?;
        let assets = self.assets.lock().unwrap();
        Ok([AssetKind::Rank, AssetKind::Item]
            .into_iter()
            .filter_map(|kind| {
                assets.get(&(wallet.to_string(), kind)).map(|value| LedgerAsset {
                    kind,
                    value: value.clone(),
                })
            })
            .collect())
    }
}
