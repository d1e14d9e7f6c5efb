//! Key-value backing traits
//!
//! This module defines the core trait that all storage backings must implement.

use std::path::Path;

use crate::error::StorageError;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Types of key-value backings available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// In-process map, nothing survives the process
    Memory,
    /// Single JSON document on disk
    JsonFile,
    /// SQLite database file
    Sqlite,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Memory => write!(f, "memory"),
            BackendType::JsonFile => write!(f, "json"),
            BackendType::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(BackendType::Memory),
            "json" | "file" => Ok(BackendType::JsonFile),
            "sqlite" | "db" => Ok(BackendType::Sqlite),
            other => Err(format!("Unknown backend type: {}", other)),
        }
    }
}

/// Local key-value storage holding serialized text blobs
///
/// Every value is the complete serialized form of one option set or one
/// record journal; there are no partial updates. Concurrent writers to the
/// same key are last-write-wins.
pub trait KeyValueBacking: Send + Sync {
    /// Returns the backing type
    fn backend_type(&self) -> BackendType;

    /// Returns the path to the backing file, if any
    fn path(&self) -> Option<&Path>;

    /// Reads the text stored under `key`, `None` when absent
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replaces the text stored under `key`
    fn store(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`; removing an absent key succeeds
    fn delete(&self, key: &str) -> StorageResult<()>;

    /// Removes every key
    fn clear_all(&self) -> StorageResult<()>;

    /// Lists every stored key in ascending order
    fn keys(&self) -> StorageResult<Vec<String>>;

    /// Returns true if `key` currently holds a value
    fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.load(key)?.is_some())
    }
}
