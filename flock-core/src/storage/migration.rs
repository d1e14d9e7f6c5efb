//! Utilities for moving data between backings
//!
//! Data can be copied key by key between any two backings, or dumped to a
//! JSON snapshot file for backup and interchange.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::traits::KeyValueBacking;

/// Every key of a backing at one point in time
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub exported_at: String,
    pub entries: BTreeMap<String, String>,
}

impl Snapshot {
    /// Reads every key from `backing`
    pub fn capture(backing: &dyn KeyValueBacking) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for key in backing.keys().context("Failed to list keys")? {
            if let Some(value) = backing
                .load(&key)
                .with_context(|| format!("Failed to read key '{}'", key))?
            {
                entries.insert(key, value);
            }
        }
        Ok(Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            entries,
        })
    }

    /// Writes every entry into `backing`, leaving other keys untouched
    pub fn restore(&self, backing: &dyn KeyValueBacking) -> Result<usize> {
        for (key, value) in &self.entries {
            backing
                .store(key, value)
                .with_context(|| format!("Failed to write key '{}'", key))?;
        }
        Ok(self.entries.len())
    }
}

/// Copies every key from `source` into `target`
///
/// # Returns
/// The number of keys copied
pub fn copy_all(source: &dyn KeyValueBacking, target: &dyn KeyValueBacking) -> Result<usize> {
    let snapshot = Snapshot::capture(source).context("Failed to read source storage")?;
    snapshot
        .restore(target)
        .context("Failed to write target storage")
}

/// Exports every key of `backing` to a JSON snapshot file
pub fn export_snapshot<P: AsRef<Path>>(backing: &dyn KeyValueBacking, json_path: P) -> Result<usize> {
    let snapshot = Snapshot::capture(backing)?;
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;

    if let Some(parent) = json_path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&json_path, json)
        .with_context(|| format!("Failed to write snapshot to {:?}", json_path.as_ref()))?;

    Ok(snapshot.entries.len())
}

/// Imports a JSON snapshot file into `backing`
pub fn import_snapshot<P: AsRef<Path>>(json_path: P, backing: &dyn KeyValueBacking) -> Result<usize> {
    let content = fs::read_to_string(&json_path)
        .with_context(|| format!("Failed to read snapshot file: {:?}", json_path.as_ref()))?;
    let snapshot: Snapshot = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snapshot file: {:?}", json_path.as_ref()))?;
    snapshot.restore(backing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileBacking, MemoryBacking, SqliteBacking};
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_json_to_sqlite_copy() {
        let temp_dir = TempDir::new().unwrap();
        let sqlite_file = NamedTempFile::with_suffix(".db").unwrap();

        let json = JsonFileBacking::new(temp_dir.path().join("farm.json"));
        json.store("chicken_farm_suppliers", "[]").unwrap();
        json.store("chicken_farm_chicken_records", r#"[{"id":1}]"#).unwrap();

        let sqlite = SqliteBacking::new(sqlite_file.path()).unwrap();
        let count = copy_all(&json, &sqlite).unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            sqlite.load("chicken_farm_chicken_records").unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
    }

    #[test]
    fn test_snapshot_export_import() {
        let temp_dir = TempDir::new().unwrap();
        let snapshot_path = temp_dir.path().join("backup").join("snapshot.json");

        let source = MemoryBacking::new();
        source.store("a", "1").unwrap();
        source.store("b", "2").unwrap();
        assert_eq!(export_snapshot(&source, &snapshot_path).unwrap(), 2);

        let target = MemoryBacking::new();
        target.store("c", "3").unwrap();
        assert_eq!(import_snapshot(&snapshot_path, &target).unwrap(), 2);
        assert_eq!(target.keys().unwrap(), vec!["a", "b", "c"]);
    }
}
