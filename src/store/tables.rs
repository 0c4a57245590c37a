//! Persisted JSON key/value tables.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::{fs, io};
use tracing::{info, warn};

/// One persisted table mapping string keys to serde values.
///
/// Saves rewrite the whole table. Loads tolerate corruption: an unreadable
/// file or an undecodable entry is dropped with a warning and treated as
/// absent, never as a fatal error.
pub struct JsonTable<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> JsonTable<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Write the full table state to disk.
    pub fn save(&self, entries: &HashMap<String, T>) -> io::Result<()> {
        let content = serde_json::to_string_pretty(entries).map_err(io::Error::other)?;
        fs::write(&self.path, content)
    }

    /// Load the table, skipping entries that no longer decode.
    pub fn load(&self) -> HashMap<String, T> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!("Failed to read table {:?}: {}", self.path, e);
                return HashMap::new();
            }
        };

        let raw: HashMap<String, serde_json::Value> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Table {:?} is corrupt, treating as empty: {}", self.path, e);
                return HashMap::new();
            }
        };

        let mut entries = HashMap::new();
        for (key, value) in raw {
            match serde_json::from_value(value) {
                Ok(decoded) => {
                    entries.insert(key, decoded);
                }
                Err(e) => {
                    warn!("Dropping corrupt entry {:?} in {:?}: {}", key, self.path, e);
                }
            }
        }

        info!("Loaded {} entries from {:?}", entries.len(), self.path);
        entries
    }
}
