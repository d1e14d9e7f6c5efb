//! SQLite key-value backing
//!
//! Stores each key as one row of a `kv` table, giving readers a consistent
//! view while another process writes.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::traits::{BackendType, KeyValueBacking, StorageResult};
use crate::error::StorageError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key        TEXT PRIMARY KEY NOT NULL,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
";

/// SQLite backing implementation
pub struct SqliteBacking {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteBacking {
    /// Opens (creating if needed) the database at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let backing = Self {
            path,
            conn: Mutex::new(conn),
        };
        backing.init_schema()?;
        Ok(backing)
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("sqlite connection lock poisoned".to_string()))
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;

        let current_version: Option<i32> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
            .optional()?;

        match current_version {
            None => {
                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    [SCHEMA_VERSION],
                )?;
            }
            Some(v) if v > SCHEMA_VERSION => {
                return Err(StorageError::Unavailable(format!(
                    "database schema version {} is newer than supported version {}",
                    v, SCHEMA_VERSION
                )));
            }
            Some(_) => {}
        }
        Ok(())
    }
}

impl KeyValueBacking for SqliteBacking {
    fn backend_type(&self) -> BackendType {
        BackendType::Sqlite
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn store(&self, key: &str, value: &str) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }

    fn clear_all(&self) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sqlite_backing_crud() {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        let backing = SqliteBacking::new(temp_file.path()).unwrap();

        assert_eq!(backing.load("k").unwrap(), None);

        backing.store("k", "first").unwrap();
        backing.store("k", "second").unwrap();
        assert_eq!(backing.load("k").unwrap().as_deref(), Some("second"));
        assert_eq!(backing.keys().unwrap(), vec!["k"]);

        backing.delete("k").unwrap();
        assert_eq!(backing.load("k").unwrap(), None);
    }

    #[test]
    fn test_sqlite_backing_survives_reopen() {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        {
            let backing = SqliteBacking::new(temp_file.path()).unwrap();
            backing.store("chicken_farm_death_reasons", "[]").unwrap();
        }

        let backing = SqliteBacking::new(temp_file.path()).unwrap();
        assert!(backing.contains("chicken_farm_death_reasons").unwrap());

        backing.clear_all().unwrap();
        assert!(backing.keys().unwrap().is_empty());
    }
}
