//! Persisted values, history and levels.
//!
//! Each mapping lives in its own JSON file, keys sorted. Loading never
//! fails: a missing file is an empty mapping and a malformed one is logged
//! and treated as empty.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{MenuError, Result};
use crate::model::{Arg, CommandId, MAX_LEVEL};

mod backend;

pub use backend::{FsBackend, MemoryBackend, StoreBackend};

pub const VALUES_FILE: &str = "values.json";
pub const HISTORY_FILE: &str = "history.json";
pub const LEVELS_FILE: &str = "levels.json";

/// Saved prefix values, by command.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueStore {
    values: BTreeMap<CommandId, Vec<Arg>>,
}

impl ValueStore {
    pub fn get(&self, command: &str) -> Option<&[Arg]> {
        self.values.get(command).map(Vec::as_slice)
    }

    pub fn set(&mut self, command: impl Into<CommandId>, value: Vec<Arg>) {
        self.values.insert(command.into(), value);
    }

    pub fn remove(&mut self, command: &str) -> Option<Vec<Arg>> {
        self.values.remove(command)
    }
}

/// One history entry: a string read for an infix, or a whole prefix value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryItem {
    Text(String),
    Args(Vec<Arg>),
}

/// Most recent first, no duplicates, at most `limit` entries per key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryStore {
    entries: BTreeMap<String, Vec<HistoryItem>>,
    limit: usize,
}

impl HistoryStore {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            limit,
        }
    }

    fn from_entries(mut entries: BTreeMap<String, Vec<HistoryItem>>, limit: usize) -> Self {
        for items in entries.values_mut() {
            let mut seen = Vec::with_capacity(items.len());
            items.retain(|i| {
                let fresh = !seen.contains(i);
                if fresh {
                    seen.push(i.clone());
                }
                fresh
            });
            items.truncate(limit);
        }
        entries.retain(|_, items| !items.is_empty());
        Self { entries, limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn push(&mut self, key: impl Into<String>, item: HistoryItem) {
        if self.limit == 0 {
            return;
        }
        let items = self.entries.entry(key.into()).or_default();
        items.retain(|i| *i != item);
        items.insert(0, item);
        items.truncate(self.limit);
    }

    pub fn get(&self, key: &str) -> &[HistoryItem] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Strings read for an infix, most recent first.
    pub fn texts(&self, key: &str) -> Vec<String> {
        self.get(key)
            .iter()
            .filter_map(|i| match i {
                HistoryItem::Text(s) => Some(s.clone()),
                HistoryItem::Args(_) => None,
            })
            .collect()
    }

    /// Prefix values, most recent first.
    pub fn values(&self, key: &str) -> Vec<Vec<Arg>> {
        self.get(key)
            .iter()
            .filter_map(|i| match i {
                HistoryItem::Args(a) => Some(a.clone()),
                HistoryItem::Text(_) => None,
            })
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<u8>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub suffixes: BTreeMap<CommandId, u8>,
}

/// Level overrides: per prefix, and per suffix within a prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelStore {
    levels: BTreeMap<CommandId, LevelEntry>,
}

impl LevelStore {
    pub fn prefix_level(&self, prefix: &str) -> Option<u8> {
        self.levels.get(prefix)?.prefix
    }

    pub fn suffix_level(&self, prefix: &str, command: &str) -> Option<u8> {
        self.levels.get(prefix)?.suffixes.get(command).copied()
    }

    pub fn set_prefix_level(&mut self, prefix: &str, level: u8) -> Result<()> {
        check_level(level)?;
        self.levels.entry(prefix.to_string()).or_default().prefix = Some(level);
        Ok(())
    }

    pub fn set_suffix_level(&mut self, prefix: &str, command: &str, level: u8) -> Result<()> {
        check_level(level)?;
        self.levels
            .entry(prefix.to_string())
            .or_default()
            .suffixes
            .insert(command.to_string(), level);
        Ok(())
    }

    pub fn entry(&self, prefix: &str) -> Option<&LevelEntry> {
        self.levels.get(prefix)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LevelEntry)> {
        self.levels.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn check_level(level: u8) -> Result<()> {
    if level > MAX_LEVEL {
        return Err(MenuError::Store(format!(
            "level {} is outside 0..={}",
            level, MAX_LEVEL
        )));
    }
    Ok(())
}

/// The three mappings and the backend they persist to.
pub struct Store {
    backend: Box<dyn StoreBackend>,
    pub values: ValueStore,
    pub history: HistoryStore,
    pub levels: LevelStore,
}

impl Store {
    pub fn load(backend: Box<dyn StoreBackend>, history_limit: usize) -> Self {
        let values = load_file(backend.as_ref(), VALUES_FILE);
        let history = HistoryStore::from_entries(
            load_file(backend.as_ref(), HISTORY_FILE),
            history_limit,
        );
        let levels = load_file(backend.as_ref(), LEVELS_FILE);
        Self {
            backend,
            values,
            history,
            levels,
        }
    }

    pub fn in_memory(history_limit: usize) -> Self {
        Self::load(Box::new(MemoryBackend::new()), history_limit)
    }

    pub fn save_values(&mut self) -> Result<()> {
        save_file(self.backend.as_mut(), VALUES_FILE, &self.values)
    }

    pub fn save_history(&mut self) -> Result<()> {
        save_file(self.backend.as_mut(), HISTORY_FILE, &self.history.entries)
    }

    pub fn save_levels(&mut self) -> Result<()> {
        save_file(self.backend.as_mut(), LEVELS_FILE, &self.levels)
    }
}

fn load_file<T: DeserializeOwned + Default>(backend: &dyn StoreBackend, name: &str) -> T {
    let bytes = match backend.read(name) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(file = name, error = %format!("{:#}", e), "store unreadable, starting empty");
            return T::default();
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(v) => {
            tracing::debug!(file = name, "store loaded");
            v
        }
        Err(e) => {
            tracing::warn!(file = name, error = %e, "store malformed, starting empty");
            T::default()
        }
    }
}

fn save_file<T: Serialize>(backend: &mut dyn StoreBackend, name: &str, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| MenuError::Store(format!("serialize {}: {}", name, e)))?;
    bytes.push(b'\n');
    backend
        .write(name, &bytes)
        .map_err(|e| MenuError::Store(format!("{:#}", e)))
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
