//! Write-through asset cache backed by persisted JSON tables.
//!
//! The store is the offline half of the synchronization engine: every
//! write lands here so reads keep working through a ledger outage, and
//! reconciliation replaces cached values with whatever the ledger reports.
//! All operations are synchronous and serialized behind one mutex; every
//! mutation flushes the owning table to disk before returning, so a crash
//! loses at most the in-flight operation.

pub mod tables;

use crate::ledger::AssetKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tables::JsonTable;
use tracing::error;

/// A single cached asset held by a wallet for a given kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub wallet: String,
    pub kind: AssetKind,
    pub value: String,
}

/// Full serialized representation of a stored item.
///
/// Item assets must be reconstructible losslessly when retrieved on a
/// different server instance, so the cache keeps the whole item rather
/// than just the type identifier used for mint/burn bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub item_type: String,
    pub display_name: Option<String>,
    pub quantity: u32,
    /// Arbitrary item metadata (enchantments, durability, lore, ...).
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

/// Cached state for the item kind. The bookkeeping value and the full
/// payload have independent lifecycles: reconciliation can learn a value
/// from the ledger without ever seeing the payload, and a payload can
/// outlive a burned record until explicitly removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedItem {
    value: Option<String>,
    payload: Option<ItemPayload>,
}

struct StoreState {
    ranks: HashMap<String, String>,
    items: HashMap<String, CachedItem>,
}

/// In-memory wallet → asset cache with write-through persistence.
pub struct AssetStore {
    state: Mutex<StoreState>,
    rank_table: JsonTable<String>,
    item_table: JsonTable<CachedItem>,
}

impl AssetStore {
    /// Open the store, loading any persisted tables under `data_dir`.
    pub fn open(data_dir: &Path) -> Self {
        let rank_table = JsonTable::new(data_dir.join("ranks.json"));
        let item_table = JsonTable::new(data_dir.join("items.json"));
        let state = StoreState {
            ranks: rank_table.load(),
            items: item_table.load(),
        };
        Self {
            state: Mutex::new(state),
            rank_table,
            item_table,
        }
    }

    /// The cached asset for a (wallet, kind), if any.
    pub fn get(&self, wallet: &str, kind: AssetKind) -> Option<AssetRecord> {
        let state = self.state.lock().unwrap();
        let value = match kind {
            AssetKind::Rank => state.ranks.get(wallet).cloned(),
            AssetKind::Item => state.items.get(wallet).and_then(|item| item.value.clone()),
        };
        value.map(|value| AssetRecord {
            wallet: wallet.to_string(),
            kind,
            value,
        })
    }

    /// Insert or replace the cached value for a (wallet, kind).
    pub fn put(&self, wallet: &str, kind: AssetKind, value: &str) {
        let mut state = self.state.lock().unwrap();
        match kind {
            AssetKind::Rank => {
                state.ranks.insert(wallet.to_string(), value.to_string());
                self.flush_ranks(&state);
            }
            AssetKind::Item => {
                state
                    .items
                    .entry(wallet.to_string())
                    .and_modify(|item| item.value = Some(value.to_string()))
                    .or_insert_with(|| CachedItem {
                        value: Some(value.to_string()),
                        payload: None,
                    });
                self.flush_items(&state);
            }
        }
    }

    /// Remove the cached value for a (wallet, kind). The item payload, if
    /// any, is untouched.
    pub fn remove(&self, wallet: &str, kind: AssetKind) {
        let mut state = self.state.lock().unwrap();
        match kind {
            AssetKind::Rank => {
                if state.ranks.remove(wallet).is_some() {
                    self.flush_ranks(&state);
                }
            }
            AssetKind::Item => {
                let drop_entry = match state.items.get_mut(wallet) {
                    Some(item) => {
                        item.value = None;
                        item.payload.is_none()
                    }
                    None => return,
                };
                if drop_entry {
                    state.items.remove(wallet);
                }
                self.flush_items(&state);
            }
        }
    }

    /// The full serialized item stored for a wallet, if any.
    pub fn get_item_payload(&self, wallet: &str) -> Option<ItemPayload> {
        let state = self.state.lock().unwrap();
        state.items.get(wallet).and_then(|item| item.payload.clone())
    }

    /// Store the full serialized item for a wallet.
    pub fn put_item_payload(&self, wallet: &str, payload: ItemPayload) {
        let mut state = self.state.lock().unwrap();
        state
            .items
            .entry(wallet.to_string())
            .and_modify(|item| item.payload = Some(payload.clone()))
            .or_insert_with(|| CachedItem {
                value: None,
                payload: Some(payload),
            });
        self.flush_items(&state);
    }

    /// Drop the stored item payload for a wallet.
    pub fn remove_item_payload(&self, wallet: &str) {
        let mut state = self.state.lock().unwrap();
        let drop_entry = match state.items.get_mut(wallet) {
            Some(item) => {
                item.payload = None;
                item.value.is_none()
            }
            None => return,
        };
        if drop_entry {
            state.items.remove(wallet);
        }
        self.flush_items(&state);
    }

    fn flush_ranks(&self, state: &StoreState) {
        if let Err(e) = self.rank_table.save(&state.ranks) {
            error!("Failed to persist rank table: {}", e);
        }
    }

    fn flush_items(&self, state: &StoreState) {
        if let Err(e) = self.item_table.save(&state.items) {
            error!("Failed to persist item table: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn payload(item_type: &str) -> ItemPayload {
        ItemPayload {
            item_type: item_type.to_string(),
            display_name: Some("Excalibur".to_string()),
            quantity: 1,
            attributes: HashMap::from([(
                "enchantments".to_string(),
                serde_json::json!({"sharpness": 5}),
            )]),
        }
    }

    #[test]
    fn put_then_get_returns_record() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::open(dir.path());

        store.put("0xabc", AssetKind::Rank, "vip");
        let record = store.get("0xabc", AssetKind::Rank).unwrap();
        assert_eq!(record.value, "vip");
        assert_eq!(record.kind, AssetKind::Rank);
        assert!(store.get("0xabc", AssetKind::Item).is_none());
    }

    #[test]
    fn put_replaces_rather_than_duplicates() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::open(dir.path());

        store.put("0xabc", AssetKind::Rank, "vip");
        store.put("0xabc", AssetKind::Rank, "mvp");
        assert_eq!(store.get("0xabc", AssetKind::Rank).unwrap().value, "mvp");
    }

    #[test]
    fn state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = AssetStore::open(dir.path());
            store.put("0xabc", AssetKind::Rank, "vip");
            store.put("0xabc", AssetKind::Item, "DIAMOND_SWORD");
            store.put_item_payload("0xabc", payload("DIAMOND_SWORD"));
        }

        let reopened = AssetStore::open(dir.path());
        assert_eq!(reopened.get("0xabc", AssetKind::Rank).unwrap().value, "vip");
        assert_eq!(
            reopened.get("0xabc", AssetKind::Item).unwrap().value,
            "DIAMOND_SWORD"
        );
        assert_eq!(
            reopened.get_item_payload("0xabc").unwrap(),
            payload("DIAMOND_SWORD")
        );
    }

    #[test]
    fn item_payload_is_independent_of_record() {
        let dir = TempDir::new().unwrap();
        let store = AssetStore::open(dir.path());

        store.put("0xabc", AssetKind::Item, "DIAMOND_SWORD");
        store.put_item_payload("0xabc", payload("DIAMOND_SWORD"));

        // Removing the record keeps the payload; the wallet can still
        // reconstruct the item once the record is re-learned.
        store.remove("0xabc", AssetKind::Item);
        assert!(store.get("0xabc", AssetKind::Item).is_none());
        assert!(store.get_item_payload("0xabc").is_some());

        store.remove_item_payload("0xabc");
        assert!(store.get_item_payload("0xabc").is_none());
    }

    #[test]
    fn corrupt_rank_entry_is_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("ranks.json"),
            r#"{"0xgood": "vip", "0xbad": 42}"#,
        )
        .unwrap();

        let store = AssetStore::open(dir.path());
        assert_eq!(store.get("0xgood", AssetKind::Rank).unwrap().value, "vip");
        assert!(store.get("0xbad", AssetKind::Rank).is_none());
    }
}
