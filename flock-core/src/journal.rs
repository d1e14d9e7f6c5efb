//! Append-only record journals
//!
//! Each record page keeps its submissions in a [`Journal`]: a newest-first
//! list persisted in full under one storage key after every change.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::next_time_id;
use crate::storage::{self, SharedBacking};

/// One timestamped record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry<T> {
    pub id: u64,
    #[serde(default = "Utc::now")]
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: T,
}

/// Persisted newest-first list of records
pub struct Journal<T> {
    key: String,
    backing: SharedBacking,
    entries: Vec<JournalEntry<T>>,
    last_write_ok: bool,
}

impl<T> Journal<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Reads the journal under `key`; absent or unreadable data yields an
    /// empty journal
    pub fn load(backing: SharedBacking, key: impl Into<String>) -> Self {
        let key = key.into();
        let entries = storage::load_or(backing.as_ref(), &key, Vec::new());
        Self {
            key,
            backing,
            entries,
            last_write_ok: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Records, newest first
    pub fn entries(&self) -> &[JournalEntry<T>] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&JournalEntry<T>> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_write_succeeded(&self) -> bool {
        self.last_write_ok
    }

    /// Prepends a new record and persists the journal
    pub fn record(&mut self, data: T) -> &JournalEntry<T> {
        let taken: Vec<u64> = self.entries.iter().map(|e| e.id).collect();
        let entry = JournalEntry {
            id: next_time_id(&taken),
            recorded_at: Utc::now(),
            data,
        };
        self.entries.insert(0, entry);
        self.persist();
        &self.entries[0]
    }

    /// Removes the record with `id`, returning whether one was found. The
    /// journal is written either way.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.persist();
        self.entries.len() != before
    }

    /// Drops every record
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&mut self) {
        self.last_write_ok = storage::save(self.backing.as_ref(), &self.key, &self.entries);
        if !self.last_write_ok {
            log::warn!("Journal '{}' updated in memory only", self.key);
        }
    }
}
