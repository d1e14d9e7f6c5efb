//! Error types shared across the core library

use thiserror::Error;

/// Errors raised by key-value backings
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Timeout waiting for lock on {0} - another process may be writing")]
    LockTimeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Backing store unavailable: {0}")]
    Unavailable(String),
}

/// A required field was missing on add/edit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Label is required")]
    EmptyLabel,

    #[error("Value is required")]
    EmptyValue,

    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("{0} is out of range")]
    OutOfRange(&'static str),
}

/// Errors raised by Option-Set mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionSetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Index {index} is out of range for {len} options")]
    IndexOutOfRange { index: usize, len: usize },
}
