//! Patient identifier generation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix shared by every generated patient ID.
pub const ID_PREFIX: &str = "PAT";

/// Upper bound (exclusive) of the random suffix in timestamped IDs.
const SUFFIX_RANGE: u128 = 1000;

/// How new patient IDs are minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// `PAT-<epoch-millis>-<0..=999>`. Two IDs minted in the same
    /// millisecond collide with probability 1/1000.
    #[default]
    Timestamped,
    /// `PAT-<uuid-v4>`, collision resistant.
    Uuid,
}

impl IdStrategy {
    /// Mint a new ID.
    pub fn generate(self) -> String {
        match self {
            IdStrategy::Timestamped => {
                let millis = chrono::Utc::now().timestamp_millis();
                let suffix = Uuid::new_v4().as_u128() % SUFFIX_RANGE;
                format!("{}-{}-{}", ID_PREFIX, millis, suffix)
            }
            IdStrategy::Uuid => format!("{}-{}", ID_PREFIX, Uuid::new_v4()),
        }
    }
}

/// Mint an ID with the default timestamped format.
pub fn generate_id() -> String {
    IdStrategy::default().generate()
}
