//! In-memory key-value backing

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::traits::{BackendType, KeyValueBacking, StorageResult};
use crate::error::StorageError;

/// Map-backed storage for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryBacking {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryBacking {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> StorageResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory backing lock poisoned".to_string()))
    }
}

impl KeyValueBacking for MemoryBacking {
    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }

    fn path(&self) -> Option<&Path> {
        None
    }

    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn store(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn clear_all(&self) -> StorageResult<()> {
        self.entries()?.clear();
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backing_crud() {
        let backing = MemoryBacking::new();
        assert_eq!(backing.load("a").unwrap(), None);

        backing.store("b", "2").unwrap();
        backing.store("a", "1").unwrap();
        assert_eq!(backing.load("a").unwrap().as_deref(), Some("1"));
        assert_eq!(backing.keys().unwrap(), vec!["a", "b"]);

        backing.delete("a").unwrap();
        backing.delete("a").unwrap();
        assert!(!backing.contains("a").unwrap());

        backing.clear_all().unwrap();
        assert!(backing.keys().unwrap().is_empty());
    }
}
