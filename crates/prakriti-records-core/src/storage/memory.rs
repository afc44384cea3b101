//! In-memory storage.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStorage, StorageError, StorageResult};

/// In-memory key-value storage.
///
/// Optionally enforces a byte quota over all keys and values, or refuses
/// every access, to mimic a full or disabled browser store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
    disabled: bool,
}

impl MemoryStorage {
    /// Empty, unlimited storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty storage holding at most `quota` bytes of keys plus values.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            quota: Some(quota),
            ..Self::default()
        }
    }

    /// Storage that fails every read and write.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    fn check_enabled(&self) -> StorageResult<()> {
        if self.disabled {
            return Err(StorageError::Unavailable("storage is disabled".into()));
        }
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        self.check_enabled()?;
        let entries = self.entries.lock()?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_enabled()?;
        let mut entries = self.entries.lock()?;

        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
