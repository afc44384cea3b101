//! Key-value storage backends for the record store.

mod memory;
mod schema;
mod sqlite;

pub use memory::*;
pub use schema::*;
pub use sqlite::*;

use std::sync::Arc;
use thiserror::Error;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StorageError::LockPoisoned
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String key-value storage, in the shape of a browser's local storage.
pub trait KeyValueStorage {
    /// Read the value under `key`, `None` if unset.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value under `key`.
    fn write(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for &T {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).write(key, value)
    }
}
