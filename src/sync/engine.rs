//! Asset synchronization engine.
//!
//! The engine is the single entry point for every asset read and write.
//! It routes each operation to the remote ledger or the local cache based
//! on availability, keeps the cache write-through on writes and reconciled
//! on reads, and owns the identity → wallet link table. Reads are total:
//! they never fail toward the caller, they only degrade to cached data or
//! an explicit offline placeholder.

use crate::ledger::address::{self, AddressError};
use crate::ledger::{AssetKind, LedgerAsset, LedgerClient};
use crate::store::{AssetRecord, AssetStore, ItemPayload};
use crate::store::tables::JsonTable;
use crate::sync::monitor::AvailabilityMonitor;
use crate::sync::side_effects::RankSideEffects;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Result of a caller-facing asset read.
///
/// `Offline` is distinct from `Absent`: callers must be able to tell
/// "I have no rank" apart from "I might have a rank but cannot check".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetReadResult {
    /// The asset exists; value from the ledger or the cache.
    Found(AssetRecord),
    /// The asset definitively does not exist.
    Absent,
    /// The ledger is unreachable and the cache has no entry, so the real
    /// value cannot currently be determined.
    Offline,
}

impl AssetReadResult {
    pub fn into_record(self) -> Option<AssetRecord> {
        match self {
            AssetReadResult::Found(record) => Some(record),
            _ => None,
        }
    }
}

/// Outcome of a write. Both variants are successes from the caller's
/// point of view; `Cached` means the write was demoted from on-chain to
/// the local cache and will converge through reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Minted,
    Cached,
}

/// Outcome of an asset removal. The cache entry is gone either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Burned,
    CachedOnly,
}

/// Notices broadcast to the command/UI layer.
#[derive(Debug, Clone)]
pub enum EngineNotice {
    /// The ledger configuration is unusable; the online path is disabled
    /// until the process is reconfigured and restarted.
    LedgerMisconfigured(String),
}

/// Identity → wallet address binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletLink {
    pub address: String,
}

/// Zero address used for reachability probes.
const PROBE_WALLET: &str = "0x0000000000000000000000000000000000000000";

/// Orchestrator for ledger-backed asset state.
///
/// Constructed once per process with injected collaborators and shared by
/// handle; there is no ambient global state.
pub struct AssetSyncEngine {
    ledger: Option<Arc<dyn LedgerClient>>,
    store: AssetStore,
    monitor: AvailabilityMonitor,
    side_effects: Arc<dyn RankSideEffects>,
    wallets: Mutex<HashMap<String, WalletLink>>,
    wallet_table: JsonTable<WalletLink>,
    notices: broadcast::Sender<EngineNotice>,
}

impl AssetSyncEngine {
    /// Create the engine, restoring the wallet link table from `data_dir`.
    ///
    /// A `None` ledger runs the engine in offline-only mode for the
    /// process lifetime (misconfigured or deliberately disabled chain).
    pub fn new(
        data_dir: &Path,
        ledger: Option<Arc<dyn LedgerClient>>,
        store: AssetStore,
        monitor: AvailabilityMonitor,
        side_effects: Arc<dyn RankSideEffects>,
    ) -> Self {
        let wallet_table = JsonTable::new(data_dir.join("wallets.json"));
        let wallets = Mutex::new(wallet_table.load());
        let (notices, _) = broadcast::channel(16);
        Self {
            ledger,
            store,
            monitor,
            side_effects,
            wallets,
            wallet_table,
            notices,
        }
    }

    /// Subscribe to engine notices.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineNotice> {
        self.notices.subscribe()
    }

    /// Report an unusable ledger configuration. Sent once at startup, not
    /// per call.
    pub fn report_misconfigured(&self, reason: &str) {
        warn!("Ledger disabled: {}", reason);
        let _ = self
            .notices
            .send(EngineNotice::LedgerMisconfigured(reason.to_string()));
    }

    pub fn monitor(&self) -> &AvailabilityMonitor {
        &self.monitor
    }

    /// Probe ledger reachability with a lightweight query, feeding the
    /// availability monitor. Used at startup and by the reconciliation
    /// poller to detect recovery after an outage.
    pub async fn probe(&self) -> bool {
        let Some(ledger) = self.ledger.as_ref() else {
            return false;
        };
        match ledger.query_wallet_assets(PROBE_WALLET).await {
            Ok(_) => {
                self.monitor.record_outcome(true);
                true
            }
            Err(e) => {
                self.monitor.record_outcome(false);
                debug!("Ledger probe failed: {}", e);
                false
            }
        }
    }

    /// Read a wallet's asset of the given kind. Total: never fails.
    ///
    /// When the ledger is reachable this makes exactly one query and
    /// reconciles the returned kind into the cache; on failure mid-call it
    /// degrades to the cached value or the offline placeholder without
    /// surfacing an error.
    pub async fn get_asset(&self, wallet: &str, kind: AssetKind) -> AssetReadResult {
        if let Some(ledger) = self.online_ledger() {
            match ledger.query_wallet_assets(wallet).await {
                Ok(assets) => {
                    self.monitor.record_outcome(true);
                    return self.reconcile(wallet, kind, &assets);
                }
                Err(e) => {
                    self.monitor.record_outcome(false);
                    warn!(
                        "Ledger read of {} for {} failed: {}; serving cached state",
                        kind, wallet, e
                    );
                }
            }
        }
        match self.store.get(wallet, kind) {
            Some(record) => AssetReadResult::Found(record),
            None => AssetReadResult::Offline,
        }
    }

    /// Store an asset for a wallet, minting on the ledger when reachable
    /// and falling back to the local cache otherwise. The cache is updated
    /// in every path, so subsequent offline reads see the value
    /// immediately.
    ///
    /// Callers are expected to check for an existing asset of this kind
    /// via [`Self::get_asset`] first; the check and the mint are separate
    /// steps, not one atomic operation.
    pub async fn set_asset(&self, wallet: &str, kind: AssetKind, value: &str) -> WriteOutcome {
        let mut outcome = WriteOutcome::Cached;
        if let Some(ledger) = self.online_ledger() {
            match ledger.mint(wallet, kind, value).await {
                Ok(()) => {
                    self.monitor.record_outcome(true);
                    outcome = WriteOutcome::Minted;
                    info!("Minted {} {:?} for {}", kind, value, wallet);
                }
                Err(e) => {
                    self.monitor.record_outcome(false);
                    warn!(
                        "Failed to mint {} for {}: {}; caching locally",
                        kind, wallet, e
                    );
                }
            }
        }
        self.store.put(wallet, kind, value);
        if kind == AssetKind::Rank {
            self.apply_rank_effect(wallet, value).await;
        }
        outcome
    }

    /// Remove a wallet's asset of the given kind, burning on the ledger
    /// when reachable. The cache entry is removed regardless of the
    /// ledger outcome: the initiator (e.g. a wallet unlink) must be able
    /// to proceed.
    pub async fn clear_asset(&self, wallet: &str, kind: AssetKind) -> ClearOutcome {
        let removed = self.store.get(wallet, kind);
        let mut outcome = ClearOutcome::CachedOnly;
        if let Some(ledger) = self.online_ledger() {
            match ledger.burn(wallet, kind).await {
                Ok(()) => {
                    self.monitor.record_outcome(true);
                    outcome = ClearOutcome::Burned;
                    info!("Burned {} for {}", kind, wallet);
                }
                Err(e) => {
                    self.monitor.record_outcome(false);
                    warn!(
                        "Failed to burn {} for {}: {}; clearing cache anyway",
                        kind, wallet, e
                    );
                }
            }
        }
        self.store.remove(wallet, kind);
        if kind == AssetKind::Item {
            self.store.remove_item_payload(wallet);
        }
        if kind == AssetKind::Rank {
            if let Some(record) = removed {
                self.remove_rank_effect(wallet, &record.value).await;
            }
        }
        outcome
    }

    /// Validate a raw private key and derive its checksummed wallet
    /// address. Pure and synchronous; no ledger I/O.
    pub fn derive_address(&self, raw_secret: &str) -> Result<String, AddressError> {
        address::derive_address(raw_secret)
    }

    /// Bind an identity to the wallet controlled by `raw_secret`,
    /// replacing any previous link.
    pub fn link_wallet(&self, identity: &str, raw_secret: &str) -> Result<String, AddressError> {
        let address = address::derive_address(raw_secret)?;
        {
            let mut wallets = self.wallets.lock().unwrap();
            wallets.insert(
                identity.to_string(),
                WalletLink {
                    address: address.clone(),
                },
            );
            self.flush_wallets(&wallets);
        }
        info!("Linked wallet {} to {}", address, identity);
        Ok(address)
    }

    /// Unbind an identity's wallet, burning its assets first (cascading
    /// burn). Returns the unlinked address, if any.
    pub async fn unlink_wallet(&self, identity: &str) -> Option<String> {
        let link = { self.wallets.lock().unwrap().get(identity).cloned() }?;
        self.clear_asset(&link.address, AssetKind::Rank).await;
        self.clear_asset(&link.address, AssetKind::Item).await;
        {
            let mut wallets = self.wallets.lock().unwrap();
            wallets.remove(identity);
            self.flush_wallets(&wallets);
        }
        info!("Unlinked wallet {} from {}", link.address, identity);
        Some(link.address)
    }

    /// The wallet address linked to an identity, if any.
    pub fn wallet_of(&self, identity: &str) -> Option<String> {
        self.wallets
            .lock()
            .unwrap()
            .get(identity)
            .map(|link| link.address.clone())
    }

    /// Addresses of all linked wallets, for reconciliation.
    pub fn linked_wallets(&self) -> Vec<String> {
        self.wallets
            .lock()
            .unwrap()
            .values()
            .map(|link| link.address.clone())
            .collect()
    }

    /// The full serialized item stored for a wallet, if any.
    pub fn item_payload(&self, wallet: &str) -> Option<ItemPayload> {
        self.store.get_item_payload(wallet)
    }

    /// Store the full serialized item for a wallet, alongside its asset
    /// record.
    pub fn put_item_payload(&self, wallet: &str, payload: ItemPayload) {
        self.store.put_item_payload(wallet, payload);
    }

    fn online_ledger(&self) -> Option<Arc<dyn LedgerClient>> {
        if self.monitor.is_available() {
            self.ledger.clone()
        } else {
            None
        }
    }

    /// Fold one queried kind into the cache and classify the result.
    fn reconcile(&self, wallet: &str, kind: AssetKind, assets: &[LedgerAsset]) -> AssetReadResult {
        match assets.iter().find(|asset| asset.kind == kind) {
            Some(asset) => {
                // The ledger is authoritative: replace the cached value
                // wholesale.
                self.store.put(wallet, kind, &asset.value);
                AssetReadResult::Found(AssetRecord {
                    wallet: wallet.to_string(),
                    kind,
                    value: asset.value.clone(),
                })
            }
            None => {
                // No such asset on-chain: drop any stale cache entry so
                // cache and ledger agree about existence.
                self.store.remove(wallet, kind);
                AssetReadResult::Absent
            }
        }
    }

    async fn apply_rank_effect(&self, wallet: &str, rank: &str) {
        let Some(identity) = self.identity_of(wallet) else {
            return;
        };
        if let Err(e) = self.side_effects.apply_rank(&identity, rank).await {
            warn!(
                "Rank side effect ({}) failed for {}: {}",
                self.side_effects.name(),
                identity,
                e
            );
        }
    }

    async fn remove_rank_effect(&self, wallet: &str, rank: &str) {
        let Some(identity) = self.identity_of(wallet) else {
            return;
        };
        if let Err(e) = self.side_effects.remove_rank(&identity, rank).await {
            warn!(
                "Rank side effect ({}) failed for {}: {}",
                self.side_effects.name(),
                identity,
                e
            );
        }
    }

    fn identity_of(&self, wallet: &str) -> Option<String> {
        self.wallets
            .lock()
            .unwrap()
            .iter()
            .find(|(_, link)| link.address == wallet)
            .map(|(identity, _)| identity.clone())
    }

    fn flush_wallets(&self, wallets: &HashMap<String, WalletLink>) {
        if let Err(e) = self.wallet_table.save(wallets) {
            warn!("Failed to persist wallet links: {}", e);
        }
    }
}
