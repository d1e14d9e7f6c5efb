//! Persisted, ordered option sets
//!
//! An [`OptionSetStore`] owns one category's sequence of options. It is
//! materialised from storage once, and every mutation replaces the whole
//! sequence in memory, writes it back under the set's key and notifies
//! subscribers. Write failures never roll back the in-memory sequence.

use std::fmt;

use crate::categories::OptionCategory;
use crate::error::OptionSetError;
use crate::models::{self, OptionDraft, OptionFields, OptionId, OptionItem};
use crate::storage::{self, SharedBacking};

type Listener = Box<dyn FnMut(&[OptionItem])>;

/// One category's options plus the storage they are synced to
pub struct OptionSetStore {
    key: String,
    backing: SharedBacking,
    defaults: Vec<OptionItem>,
    options: Vec<OptionItem>,
    revision: u64,
    last_write_ok: bool,
    listeners: Vec<Listener>,
}

impl fmt::Debug for OptionSetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSetStore")
            .field("key", &self.key)
            .field("options", &self.options)
            .field("revision", &self.revision)
            .field("last_write_ok", &self.last_write_ok)
            .finish_non_exhaustive()
    }
}

impl OptionSetStore {
    /// Reads the set stored under `key`, or uses `defaults` when the key is
    /// absent or unreadable. Loading never writes.
    pub fn load(backing: SharedBacking, key: impl Into<String>, defaults: Vec<OptionItem>) -> Self {
        let key = key.into();
        let options = storage::load_or(backing.as_ref(), &key, defaults.clone());
        Self {
            key,
            backing,
            defaults,
            options,
            revision: 0,
            last_write_ok: true,
            listeners: Vec::new(),
        }
    }

    /// Loads one of the built-in categories with its default sequence
    pub fn for_category(backing: SharedBacking, category: OptionCategory) -> Self {
        Self::load(backing, category.storage_key(), category.defaults())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn options(&self) -> &[OptionItem] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Incremented on every mutation; lets views detect a changed sequence
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the most recent write reached storage
    pub fn last_write_succeeded(&self) -> bool {
        self.last_write_ok
    }

    pub fn get(&self, id: OptionId) -> Option<&OptionItem> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn position(&self, id: OptionId) -> Option<usize> {
        self.options.iter().position(|o| o.id == id)
    }

    /// First option carrying `value`; values are not required to be unique
    pub fn find_by_value(&self, value: &str) -> Option<&OptionItem> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Registers a callback invoked once per mutation with the new sequence
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&[OptionItem]) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Appends a new option with a fresh id
    pub fn add(&mut self, draft: OptionDraft) -> Result<&[OptionItem], OptionSetError> {
        let next = models::appended(&self.options, draft)?;
        Ok(self.commit(next))
    }

    /// Replaces label and value of the option matching `id`, keeping its
    /// position. An unknown id leaves the sequence as is but still writes.
    pub fn edit(&mut self, id: OptionId, fields: OptionFields) -> Result<&[OptionItem], OptionSetError> {
        let next = models::edited(&self.options, id, fields)?;
        Ok(self.commit(next))
    }

    /// Removes the option matching `id`; absent ids are a no-op that still
    /// writes
    pub fn remove(&mut self, id: OptionId) -> &[OptionItem] {
        let next = models::removed(&self.options, id);
        self.commit(next)
    }

    /// Moves the option at `from` to `to`, with `to` counted after removal.
    /// Equal indices change nothing and skip the write.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<&[OptionItem], OptionSetError> {
        let next = models::reordered(&self.options, from, to)?;
        if from == to {
            return Ok(&self.options);
        }
        Ok(self.commit(next))
    }

    /// Replaces the whole sequence, e.g. after an import
    pub fn replace(&mut self, options: Vec<OptionItem>) -> &[OptionItem] {
        self.commit(options)
    }

    /// Re-reads the sequence from storage. Used when another writer may have
    /// touched the key; does not write or notify.
    pub fn reload(&mut self) -> &[OptionItem] {
        self.options = storage::load_or(self.backing.as_ref(), &self.key, self.defaults.clone());
        self.revision += 1;
        &self.options
    }

    /// Drops the stored sequence and goes back to the defaults
    pub fn reset(&mut self) -> &[OptionItem] {
        self.last_write_ok = storage::remove(self.backing.as_ref(), &self.key);
        self.options = self.defaults.clone();
        self.revision += 1;
        self.notify();
        &self.options
    }

    fn commit(&mut self, next: Vec<OptionItem>) -> &[OptionItem] {
        self.options = next;
        self.revision += 1;
        self.last_write_ok = storage::save(self.backing.as_ref(), &self.key, &self.options);
        if !self.last_write_ok {
            log::warn!(
                "Option set '{}' updated in memory only; change may be lost on reload",
                self.key
            );
        }
        self.notify();
        &self.options
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.options);
        }
    }
}
