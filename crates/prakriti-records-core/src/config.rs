//! Record store configuration.

use serde::{Deserialize, Serialize};

use crate::validator::IdStrategy;

/// Storage key the patient collection lives under.
pub const DEFAULT_STORAGE_KEY: &str = "patients";

/// Record store settings. Every field has a default, so partial JSON
/// documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Key holding the serialized collection
    pub storage_key: String,
    /// How IDs are minted for new records
    pub id_strategy: IdStrategy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            id_strategy: IdStrategy::default(),
        }
    }
}

impl StoreConfig {
    /// Parse a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
