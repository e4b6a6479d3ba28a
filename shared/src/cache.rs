//! Keyed query cache shared by the event handlers.
//!
//! Values are whole JSON documents and are only ever replaced, never patched.
//! Every mutation bumps the cache revision and lands in a change journal that
//! the app drains once per event to decide whether the view needs a render.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::model::{ProblemStatement, Solution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKey {
    ProblemStatement,
    Solution,
    /// Debug revision of the solution.
    NewSolution,
}

impl CacheKey {
    pub const ALL: [CacheKey; 3] = [
        CacheKey::ProblemStatement,
        CacheKey::Solution,
        CacheKey::NewSolution,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CacheKey::ProblemStatement => "problem_statement",
            CacheKey::Solution => "solution",
            CacheKey::NewSolution => "new_solution",
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("serialization failed for {key}: {message}")]
    Serialization { key: CacheKey, message: String },

    #[error("cached value under {key} has unexpected shape: {message}")]
    Deserialization { key: CacheKey, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheChange {
    Set(CacheKey),
    /// Keys removed in one batch. Renderers see all of them go at once.
    Removed(Vec<CacheKey>),
    Invalidated(CacheKey),
    Refreshed(CacheKey),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    value: Option<Value>,
    stale: bool,
    version: u64,
    updated_at: u64,
}

impl CacheEntry {
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of times a value has been written under this key.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Cache revision of the last mutation touching this entry.
    #[must_use]
    pub fn updated_at(&self) -> u64 {
        self.updated_at
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<CacheKey, CacheEntry>,
    revision: u64,
    changes: Vec<CacheChange>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: CacheKey) -> Option<&Value> {
        self.entries.get(&key).and_then(CacheEntry::value)
    }

    #[must_use]
    pub fn entry(&self, key: CacheKey) -> Option<&CacheEntry> {
        self.entries.get(&key)
    }

    #[must_use]
    pub fn contains(&self, key: CacheKey) -> bool {
        self.get(key).is_some()
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: CacheKey) -> Result<Option<T>, CacheError> {
        self.get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| CacheError::Deserialization {
                    key,
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Full replacement of the value under `key`. Clears any stale mark.
    pub fn set<T: Serialize>(&mut self, key: CacheKey, value: &T) -> Result<(), CacheError> {
        let value = serde_json::to_value(value).map_err(|e| CacheError::Serialization {
            key,
            message: e.to_string(),
        })?;
        let revision = self.bump();
        let entry = self.entries.entry(key).or_insert(CacheEntry {
            value: None,
            stale: false,
            version: 0,
            updated_at: revision,
        });
        entry.value = Some(value);
        entry.stale = false;
        entry.version += 1;
        entry.updated_at = revision;
        self.changes.push(CacheChange::Set(key));
        Ok(())
    }

    /// Returns whether anything was removed.
    pub fn remove(&mut self, key: CacheKey) -> bool {
        self.remove_many(&[key])
    }

    /// Removes every listed key under a single revision and journal entry.
    pub fn remove_many(&mut self, keys: &[CacheKey]) -> bool {
        let removed: Vec<CacheKey> = keys
            .iter()
            .copied()
            .filter(|key| self.entries.remove(key).is_some())
            .collect();
        if removed.is_empty() {
            return false;
        }
        self.bump();
        self.changes.push(CacheChange::Removed(removed));
        true
    }

    /// Marks `key` stale without dropping its value. An absent key gets an
    /// empty stale entry so "loading with nothing yet" is representable.
    pub fn invalidate(&mut self, key: CacheKey) {
        let revision = self.bump();
        let entry = self.entries.entry(key).or_insert(CacheEntry {
            value: None,
            stale: true,
            version: 0,
            updated_at: revision,
        });
        entry.stale = true;
        entry.updated_at = revision;
        self.changes.push(CacheChange::Invalidated(key));
    }

    /// Clears a stale mark while keeping the value.
    pub fn mark_fresh(&mut self, key: CacheKey) -> bool {
        let is_stale = self.entries.get(&key).is_some_and(CacheEntry::is_stale);
        if !is_stale {
            return false;
        }
        let revision = self.bump();
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.stale = false;
            entry.updated_at = revision;
        }
        self.changes.push(CacheChange::Refreshed(key));
        true
    }

    #[must_use]
    pub fn is_stale(&self, key: CacheKey) -> bool {
        self.entries.get(&key).is_some_and(CacheEntry::is_stale)
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn take_changes(&mut self) -> Vec<CacheChange> {
        std::mem::take(&mut self.changes)
    }

    #[must_use]
    pub fn problem_statement(&self) -> Option<ProblemStatement> {
        self.typed(CacheKey::ProblemStatement)
    }

    #[must_use]
    pub fn solution(&self) -> Option<Solution> {
        self.typed(CacheKey::Solution)
    }

    #[must_use]
    pub fn new_solution(&self) -> Option<Solution> {
        self.typed(CacheKey::NewSolution)
    }

    fn typed<T: DeserializeOwned>(&self, key: CacheKey) -> Option<T> {
        match self.get_as(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "dropping unreadable cache value");
                None
            }
        }
    }

    fn bump(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}
