//! JSON file key-value backing
//!
//! All keys live in a single JSON object on disk. Reads take a shared lock
//! and writes an exclusive lock on a sidecar `.lock` file so two processes
//! never interleave a read-modify-write.

use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::traits::{BackendType, KeyValueBacking, StorageResult};
use crate::error::StorageError;

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY: Duration = Duration::from_millis(100);

type Document = BTreeMap<String, String>;

/// Single-file JSON backing with advisory locking
pub struct JsonFileBacking {
    file_path: PathBuf,
    lock_file_path: PathBuf,
}

impl JsonFileBacking {
    /// Creates a backing for the given file; nothing is written until the
    /// first store
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        let file_path = file_path.as_ref().to_path_buf();
        let lock_file_path = file_path.with_extension("json.lock");
        Self {
            file_path,
            lock_file_path,
        }
    }

    fn acquire_write_lock(&self) -> StorageResult<File> {
        if let Some(parent) = self.lock_file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.lock_file_path)?;

        self.wait_for_lock(|| FileExt::try_lock_exclusive(&lock_file))?;
        Ok(lock_file)
    }

    fn acquire_read_lock(&self) -> StorageResult<Option<File>> {
        if !self.lock_file_path.exists() {
            return Ok(None);
        }

        let lock_file = OpenOptions::new().read(true).open(&self.lock_file_path)?;
        self.wait_for_lock(|| FileExt::try_lock_shared(&lock_file))?;
        Ok(Some(lock_file))
    }

    fn wait_for_lock<F>(&self, mut try_lock: F) -> StorageResult<()>
    where
        F: FnMut() -> std::io::Result<()>,
    {
        let start = Instant::now();
        loop {
            match try_lock() {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > LOCK_TIMEOUT {
                        return Err(StorageError::LockTimeout(
                            self.file_path.display().to_string(),
                        ));
                    }
                    std::thread::sleep(LOCK_RETRY);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_document(&self) -> StorageResult<Document> {
        if !self.file_path.exists() {
            return Ok(Document::new());
        }
        let file = File::open(&self.file_path)?;
        let document = serde_json::from_reader(BufReader::new(file))?;
        Ok(document)
    }

    fn write_document(&self, document: &Document) -> StorageResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&self.file_path, json)?;
        Ok(())
    }

    /// Applies `update_fn` to the document under the exclusive lock
    fn update<F>(&self, update_fn: F) -> StorageResult<()>
    where
        F: FnOnce(&mut Document),
    {
        let mut lock_file = self.acquire_write_lock()?;
        let _ = writeln!(
            lock_file,
            "Locked by PID {} at {}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        );

        let mut document = self.read_document()?;
        update_fn(&mut document);
        self.write_document(&document)
        // Lock is released when lock_file is dropped
    }
}

impl KeyValueBacking for JsonFileBacking {
    fn backend_type(&self) -> BackendType {
        BackendType::JsonFile
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.file_path)
    }

    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let _lock = self.acquire_read_lock()?;
        Ok(self.read_document()?.remove(key))
    }

    fn store(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|document| {
            document.insert(key.to_string(), value.to_string());
        })
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.update(|document| {
            document.remove(key);
        })
    }

    fn clear_all(&self) -> StorageResult<()> {
        self.update(|document| document.clear())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let _lock = self.acquire_read_lock()?;
        Ok(self.read_document()?.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_backing_missing_file_reads_absent() {
        let temp_dir = TempDir::new().unwrap();
        let backing = JsonFileBacking::new(temp_dir.path().join("data.json"));

        assert_eq!(backing.load("anything").unwrap(), None);
        assert!(backing.keys().unwrap().is_empty());
    }

    #[test]
    fn test_json_backing_store_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("data.json");

        let backing = JsonFileBacking::new(&path);
        backing.store("chicken_farm_suppliers", r#"[{"id":1}]"#).unwrap();
        backing.store("chicken_farm_feed_types", "[]").unwrap();

        // A second handle on the same file sees the writes
        let reopened = JsonFileBacking::new(&path);
        assert_eq!(
            reopened.load("chicken_farm_suppliers").unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
        assert_eq!(
            reopened.keys().unwrap(),
            vec!["chicken_farm_feed_types", "chicken_farm_suppliers"]
        );
    }

    #[test]
    fn test_json_backing_delete_and_clear() {
        let temp_dir = TempDir::new().unwrap();
        let backing = JsonFileBacking::new(temp_dir.path().join("data.json"));

        backing.store("a", "1").unwrap();
        backing.store("b", "2").unwrap();
        backing.delete("a").unwrap();
        assert_eq!(backing.load("a").unwrap(), None);
        assert_eq!(backing.load("b").unwrap().as_deref(), Some("2"));

        backing.clear_all().unwrap();
        assert!(backing.keys().unwrap().is_empty());
    }

    #[test]
    fn test_json_backing_corrupt_document_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "not json").unwrap();

        let backing = JsonFileBacking::new(&path);
        assert!(matches!(backing.load("a"), Err(StorageError::Encoding(_))));
    }
}
