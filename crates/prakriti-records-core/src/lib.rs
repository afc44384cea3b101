//! Prakriti Records Core Library
//!
//! Local patient intake records: ID generation, form validation, BMI
//! derivation and a record store over a single key-value slot.
//!
//! # Architecture
//!
//! ```text
//! Intake form → validate() ──errors──→ caller shows messages
//!                   │
//!                 (empty)
//!                   │
//!                   ▼
//!            RecordStore::save
//!                   │
//!     ┌─────────────▼─────────────┐
//!     │ read "patients" (JSON [])  │
//!     │ find-or-append by id       │
//!     │ write whole collection     │
//!     └─────────────┬─────────────┘
//!                   │
//!          KeyValueStorage
//!        (memory | SQLite file)
//! ```
//!
//! # Failure Policy
//!
//! **No operation crashes the caller.** Storage faults are logged and come
//! back as `false`; unreadable state reads as an empty collection.
//!
//! # Modules
//!
//! - [`models`]: Domain types (PatientRecord, PatientForm)
//! - [`validator`]: Form rules, BMI, ID generation
//! - [`storage`]: Key-value backends (memory, SQLite)
//! - [`store`]: Record store over a backend
//! - [`config`]: Store configuration

pub mod config;
pub mod models;
pub mod storage;
pub mod store;
pub mod validator;

// Re-export commonly used types
pub use config::StoreConfig;
pub use models::{PatientForm, PatientRecord};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
pub use store::RecordStore;
pub use validator::{validate, BmiCategory, IdStrategy};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use tracing::error;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PatientRecordsError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Invalid config: {0}")]
    ConfigError(String),
}

impl From<storage::StorageError> for PatientRecordsError {
    fn from(e: storage::StorageError) -> Self {
        PatientRecordsError::StorageError(e.to_string())
    }
}

impl From<serde_json::Error> for PatientRecordsError {
    fn from(e: serde_json::Error) -> Self {
        PatientRecordsError::ConfigError(e.to_string())
    }
}

type SharedStore = Arc<Mutex<RecordStore<Box<dyn KeyValueStorage + Send>>>>;

fn parse_config(config_json: Option<String>) -> Result<StoreConfig, PatientRecordsError> {
    match config_json {
        Some(json) if !json.trim().is_empty() => Ok(StoreConfig::from_json(&json)?),
        _ => Ok(StoreConfig::default()),
    }
}

fn wrap(
    storage: Box<dyn KeyValueStorage + Send>,
    config: StoreConfig,
) -> Arc<PatientRecordsCore> {
    Arc::new(PatientRecordsCore {
        store: Arc::new(Mutex::new(RecordStore::with_config(storage, config))),
    })
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a record store backed by a SQLite file.
#[uniffi::export]
pub fn open_store(
    path: String,
    config_json: Option<String>,
) -> Result<Arc<PatientRecordsCore>, PatientRecordsError> {
    let config = parse_config(config_json)?;
    let storage = SqliteStorage::open(&path)?;
    Ok(wrap(Box::new(storage), config))
}

/// Create an in-memory record store (for testing).
#[uniffi::export]
pub fn open_store_in_memory(
    config_json: Option<String>,
) -> Result<Arc<PatientRecordsCore>, PatientRecordsError> {
    let config = parse_config(config_json)?;
    Ok(wrap(Box::new(MemoryStorage::new()), config))
}

// =========================================================================
// Validator Functions (exported to FFI)
// =========================================================================

/// Generate a `PAT-<millis>-<n>` patient ID.
#[uniffi::export]
pub fn generate_patient_id() -> String {
    validator::generate_id()
}

/// Validate an intake form. Empty means acceptable.
#[uniffi::export]
pub fn validate_patient_form(form: FfiPatientForm) -> Vec<String> {
    validate(&form.into())
}

/// BMI to one decimal, or `""` when weight or height is missing.
#[uniffi::export]
pub fn calculate_bmi(weight: Option<f64>, height: Option<f64>) -> String {
    validator::compute_bmi(weight, height).unwrap_or_default()
}

/// BMI category label, or `""` for blank input.
#[uniffi::export]
pub fn get_bmi_category(bmi: String) -> String {
    validator::bmi_category(&bmi)
        .map(|c| c.as_str().to_string())
        .unwrap_or_default()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe record store wrapper for FFI.
///
/// The mutex serializes each read-modify-write cycle.
#[derive(uniffi::Object)]
pub struct PatientRecordsCore {
    store: SharedStore,
}

#[uniffi::export]
impl PatientRecordsCore {
    /// Mint a patient ID using the store's configured strategy.
    pub fn new_patient_id(&self) -> String {
        match self.store.lock() {
            Ok(store) => store.generate_id(),
            Err(poisoned) => {
                error!(error = %poisoned, "Store lock poisoned, using its config anyway");
                poisoned.into_inner().generate_id()
            }
        }
    }

    /// Create or update a patient. `false` on storage failure.
    pub fn save_patient(&self, patient: FfiPatient) -> bool {
        match self.store.lock() {
            Ok(store) => store.save(patient.into()),
            Err(e) => {
                error!(error = %e, "Error saving patient");
                false
            }
        }
    }

    /// All patients in stored order.
    pub fn get_patients(&self) -> Vec<FfiPatient> {
        match self.store.lock() {
            Ok(store) => store.list_all().into_iter().map(Into::into).collect(),
            Err(e) => {
                error!(error = %e, "Error loading patients");
                Vec::new()
            }
        }
    }

    /// A patient by ID.
    pub fn get_patient_by_id(&self, patient_id: String) -> Option<FfiPatient> {
        match self.store.lock() {
            Ok(store) => store.find_by_id(&patient_id).map(Into::into),
            Err(e) => {
                error!(error = %e, "Error loading patients");
                None
            }
        }
    }

    /// Delete a patient. `true` even if the ID was absent.
    pub fn delete_patient(&self, patient_id: String) -> bool {
        match self.store.lock() {
            Ok(store) => store.delete(&patient_id),
            Err(e) => {
                error!(error = %e, "Error deleting patient");
                false
            }
        }
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub patient_id: String,
    pub full_name: String,
    pub age: u32,
    pub gender: String,
    pub contact_number: String,
    pub prakriti_type: String,
    pub email: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub created_at: Option<String>,
    pub last_updated: Option<String>,
}

impl From<PatientRecord> for FfiPatient {
    fn from(patient: PatientRecord) -> Self {
        Self {
            patient_id: patient.patient_id,
            full_name: patient.full_name,
            age: patient.age,
            gender: patient.gender,
            contact_number: patient.contact_number,
            prakriti_type: patient.prakriti_type,
            email: patient.email,
            weight: patient.weight,
            height: patient.height,
            created_at: patient.created_at,
            last_updated: patient.last_updated,
        }
    }
}

impl From<FfiPatient> for PatientRecord {
    fn from(patient: FfiPatient) -> Self {
        PatientRecord {
            patient_id: patient.patient_id,
            full_name: patient.full_name,
            age: patient.age,
            gender: patient.gender,
            contact_number: patient.contact_number,
            prakriti_type: patient.prakriti_type,
            email: patient.email,
            weight: patient.weight,
            height: patient.height,
            created_at: patient.created_at,
            last_updated: patient.last_updated,
            extra: serde_json::Map::new(),
        }
    }
}

/// FFI-safe intake form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientForm {
    pub patient_id: Option<String>,
    pub full_name: String,
    pub age: Option<i64>,
    pub gender: String,
    pub contact_number: String,
    pub prakriti_type: String,
    pub email: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
}

impl From<FfiPatientForm> for PatientForm {
    fn from(form: FfiPatientForm) -> Self {
        PatientForm {
            patient_id: form.patient_id,
            full_name: form.full_name,
            age: form.age,
            gender: form.gender,
            contact_number: form.contact_number,
            prakriti_type: form.prakriti_type,
            email: form.email,
            weight: form.weight,
            height: form.height,
        }
    }
}
