//! Local key-value persistence
//!
//! This module provides a trait-based abstraction over the key-value store
//! that holds every option set and record journal, so the same data can
//! live in a JSON file, a SQLite database or plain memory.

mod json_file;
mod memory;
mod migration;
mod sqlite;
mod traits;

pub use json_file::JsonFileBacking;
pub use memory::MemoryBacking;
pub use migration::{copy_all, export_snapshot, import_snapshot, Snapshot};
pub use sqlite::SqliteBacking;
pub use traits::{BackendType, KeyValueBacking, StorageResult};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Shared handle to a backing, held by every store and journal
pub type SharedBacking = Arc<dyn KeyValueBacking>;

/// Infers the backing type from a file extension
pub fn infer_backend_type(path: &Path) -> BackendType {
    match path.extension().and_then(|e| e.to_str()) {
        Some("db") | Some("sqlite") | Some("sqlite3") => BackendType::Sqlite,
        _ => BackendType::JsonFile,
    }
}

/// Creates a backing based on the file extension or explicit type
pub fn create_backend(path: &Path, backend_type: Option<BackendType>) -> Result<SharedBacking> {
    let bt = backend_type.unwrap_or_else(|| infer_backend_type(path));

    match bt {
        BackendType::Memory => Ok(Arc::new(MemoryBacking::new())),
        BackendType::JsonFile => Ok(Arc::new(JsonFileBacking::new(path))),
        BackendType::Sqlite => {
            let backing = SqliteBacking::new(path)
                .with_context(|| format!("Failed to open SQLite database: {:?}", path))?;
            Ok(Arc::new(backing))
        }
    }
}

/// Reads and decodes the value under `key`.
///
/// A missing key, a read failure and a decode failure all yield `default`;
/// failures are logged, never returned. Nothing is written.
pub fn load_or<T: DeserializeOwned>(backing: &dyn KeyValueBacking, key: &str, default: T) -> T {
    match backing.load(key) {
        Ok(None) => default,
        Ok(Some(text)) => match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Discarding unreadable data under '{}': {}", key, e);
                default
            }
        },
        Err(e) => {
            log::warn!("Failed to read '{}': {}", key, e);
            default
        }
    }
}

/// Encodes `value` and stores it under `key`, returning whether the write
/// went through. Failures are logged.
pub fn save<T: Serialize + ?Sized>(backing: &dyn KeyValueBacking, key: &str, value: &T) -> bool {
    let text = match serde_json::to_string(value) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Failed to encode data for '{}': {}", key, e);
            return false;
        }
    };

    match backing.store(key, &text) {
        Ok(()) => {
            log::debug!("Saved {} bytes under '{}'", text.len(), key);
            true
        }
        Err(e) => {
            log::warn!("Failed to save '{}': {}", key, e);
            false
        }
    }
}

/// Deletes `key`, returning whether the delete went through
pub fn remove(backing: &dyn KeyValueBacking, key: &str) -> bool {
    match backing.delete(key) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to delete '{}': {}", key, e);
            false
        }
    }
}

/// Removes every key, returning whether the clear went through
pub fn clear(backing: &dyn KeyValueBacking) -> bool {
    match backing.clear_all() {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to clear storage: {}", e);
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::error::StorageError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Memory backing that counts writes and can be told to fail them
    #[derive(Default)]
    pub struct RecordingBacking {
        inner: MemoryBacking,
        pub writes: AtomicUsize,
        pub fail_writes: AtomicBool,
    }

    impl RecordingBacking {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        pub fn set_failing(&self, failing: bool) {
            self.fail_writes.store(failing, Ordering::SeqCst);
        }
    }

    impl KeyValueBacking for RecordingBacking {
        fn backend_type(&self) -> BackendType {
            BackendType::Memory
        }

        fn path(&self) -> Option<&Path> {
            None
        }

        fn load(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.load(key)
        }

        fn store(&self, key: &str, value: &str) -> StorageResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.store(key, value)
        }

        fn delete(&self, key: &str) -> StorageResult<()> {
            self.inner.delete(key)
        }

        fn clear_all(&self) -> StorageResult<()> {
            self.inner.clear_all()
        }

        fn keys(&self) -> StorageResult<Vec<String>> {
            self.inner.keys()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::RecordingBacking;
    use super::*;
    use crate::models::OptionItem;
    use std::path::PathBuf;

    #[test]
    fn test_infer_backend_type() {
        assert_eq!(infer_backend_type(&PathBuf::from("farm.db")), BackendType::Sqlite);
        assert_eq!(infer_backend_type(&PathBuf::from("farm.sqlite3")), BackendType::Sqlite);
        assert_eq!(infer_backend_type(&PathBuf::from("farm.json")), BackendType::JsonFile);
        assert_eq!(infer_backend_type(&PathBuf::from("farm")), BackendType::JsonFile);
    }

    #[test]
    fn test_load_or_missing_key_returns_default_without_writing() {
        let backing = RecordingBacking::new();
        let defaults = vec![OptionItem::labelled(1, "A")];

        let loaded = load_or(&backing, "missing_key", defaults.clone());
        assert_eq!(loaded, defaults);
        assert_eq!(backing.write_count(), 0);
    }

    #[test]
    fn test_load_or_corrupt_value_returns_default() {
        let backing = MemoryBacking::new();
        backing.store("k", "{not json").unwrap();

        let loaded: Vec<OptionItem> = load_or(&backing, "k", Vec::new());
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let backing = MemoryBacking::new();
        let options = vec![
            OptionItem::labelled(2, "白羽土雞"),
            OptionItem::labelled(1, "黑羽土雞"),
        ];

        assert!(save(&backing, "chicken_farm_chicken_breeds", &options));
        let loaded: Vec<OptionItem> = load_or(&backing, "chicken_farm_chicken_breeds", Vec::new());
        assert_eq!(loaded, options);
    }

    #[test]
    fn test_save_reports_write_failure() {
        let backing = RecordingBacking::new();
        backing.set_failing(true);
        assert!(!save(&backing, "k", &vec![1, 2, 3]));
        assert_eq!(backing.load("k").unwrap(), None);
    }
}
