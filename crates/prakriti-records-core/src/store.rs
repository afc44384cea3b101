//! Patient record store.
//!
//! The whole collection lives as one JSON array under a single storage key.
//! Every operation is a full read-modify-write of that value with no
//! locking; callers sharing a store across threads must serialize access
//! themselves (the FFI facade does so with a mutex).
//!
//! Public operations never return errors. Failures are logged and
//! degrade to an empty collection or a `false` result.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::StoreConfig;
use crate::models::{timestamp_now, PatientRecord};
use crate::storage::{KeyValueStorage, StorageError};

/// Record store errors. Internal only; the public API converts them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD over the persisted patient collection.
pub struct RecordStore<S> {
    storage: S,
    config: StoreConfig,
}

impl<S: KeyValueStorage> RecordStore<S> {
    /// Store with the default configuration.
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, StoreConfig::default())
    }

    pub fn with_config(storage: S, config: StoreConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Underlying storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mint a new patient ID using the configured strategy.
    pub fn generate_id(&self) -> String {
        self.config.id_strategy.generate()
    }

    /// All records in stored order. Missing or unreadable state yields an
    /// empty list.
    pub fn list_all(&self) -> Vec<PatientRecord> {
        match self.try_list_all() {
            Ok(patients) => patients,
            Err(error) => {
                warn!(key = %self.config.storage_key, %error, "Error loading patients");
                Vec::new()
            }
        }
    }

    /// First record with the given ID.
    pub fn find_by_id(&self, patient_id: &str) -> Option<PatientRecord> {
        self.list_all()
            .into_iter()
            .find(|p| p.patient_id == patient_id)
    }

    /// Create or update a record. Returns `false` if the collection could
    /// not be written.
    ///
    /// A new ID is appended with `created_at` and `last_updated` set to now.
    /// A known ID is merged over the existing record in place, keeping its
    /// `created_at` and refreshing `last_updated`.
    pub fn save(&self, record: PatientRecord) -> bool {
        let patient_id = record.patient_id.clone();
        match self.try_save(record) {
            Ok(()) => true,
            Err(error) => {
                error!(%patient_id, %error, "Error saving patient");
                false
            }
        }
    }

    /// Remove every record with the given ID. Succeeds even when none
    /// matched.
    pub fn delete(&self, patient_id: &str) -> bool {
        match self.try_delete(patient_id) {
            Ok(()) => true,
            Err(error) => {
                error!(%patient_id, %error, "Error deleting patient");
                false
            }
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.list_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn try_list_all(&self) -> StoreResult<Vec<PatientRecord>> {
        let entries = self.try_load_entries()?;
        let mut patients = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<PatientRecord>(entry) {
                Ok(patient) => patients.push(patient),
                Err(error) => warn!(index, %error, "Skipping malformed patient record"),
            }
        }
        Ok(patients)
    }

    /// Raw stored entries. Writes go through these so entries that do not
    /// decode as a [`PatientRecord`] survive edits to other records.
    fn load_entries(&self) -> Vec<Value> {
        match self.try_load_entries() {
            Ok(entries) => entries,
            Err(error) => {
                warn!(key = %self.config.storage_key, %error, "Error loading patients");
                Vec::new()
            }
        }
    }

    fn try_load_entries(&self) -> StoreResult<Vec<Value>> {
        let Some(raw) = self.storage.read(&self.config.storage_key)? else {
            return Ok(Vec::new());
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn try_save(&self, mut record: PatientRecord) -> StoreResult<()> {
        let mut entries = self.load_entries();
        let now = timestamp_now();

        let existing = entries
            .iter_mut()
            .find(|entry| entry_id(entry) == Some(record.patient_id.as_str()))
            .and_then(Value::as_object_mut);

        match existing {
            Some(existing) => {
                // Shallow merge: unset optionals are not serialized, so they
                // leave the stored value alone.
                if let Value::Object(mut incoming) = serde_json::to_value(record)? {
                    incoming.remove(CREATED_AT);
                    existing.extend(incoming);
                }

                let missing_created = existing.get(CREATED_AT).map_or(true, Value::is_null);
                if missing_created {
                    existing.insert(CREATED_AT.into(), Value::String(now.clone()));
                }
                existing.insert(LAST_UPDATED.into(), Value::String(now));
            }
            None => {
                record.created_at = Some(now.clone());
                record.last_updated = Some(now);
                entries.push(serde_json::to_value(record)?);
            }
        }

        self.write_all(&entries)
    }

    fn try_delete(&self, patient_id: &str) -> StoreResult<()> {
        let mut entries = self.load_entries();
        entries.retain(|entry| entry_id(entry) != Some(patient_id));
        self.write_all(&entries)
    }

    fn write_all(&self, entries: &[Value]) -> StoreResult<()> {
        let json = serde_json::to_string(entries)?;
        self.storage.write(&self.config.storage_key, &json)?;
        debug!(key = %self.config.storage_key, count = entries.len(), "Wrote patients");
        Ok(())
    }
}

const CREATED_AT: &str = "createdAt";
const LAST_UPDATED: &str = "lastUpdated";

/// `patientId` of a stored entry, if it is a string.
fn entry_id(entry: &Value) -> Option<&str> {
    entry.get("patientId").and_then(Value::as_str)
}
