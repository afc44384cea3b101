//! Patient record model.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A persisted patient intake record.
///
/// Field names serialize in camelCase so the stored collection keeps the
/// `patientId` / `fullName` / `createdAt` layout other readers of the
/// `"patients"` key expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Unique, immutable identifier (`PAT-<millis>-<n>` by default)
    pub patient_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub full_name: String,
    /// Age in years, 1..=150 once validated
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: u32,
    #[serde(default, deserialize_with = "lenient_text")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub contact_number: String,
    /// Ayurvedic constitution tag, treated as opaque
    #[serde(default, deserialize_with = "lenient_text")]
    pub prakriti_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Weight in kg
    #[serde(
        default,
        deserialize_with = "lenient_measure",
        skip_serializing_if = "Option::is_none"
    )]
    pub weight: Option<f64>,
    /// Height in cm
    #[serde(
        default,
        deserialize_with = "lenient_measure",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<f64>,
    /// Set once at first save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Refreshed on every save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Fields outside the typed model, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PatientRecord {
    /// Create an unsaved record with the required intake fields.
    pub fn new(
        patient_id: String,
        full_name: String,
        age: u32,
        gender: String,
        contact_number: String,
        prakriti_type: String,
    ) -> Self {
        Self {
            patient_id,
            full_name,
            age,
            gender,
            contact_number,
            prakriti_type,
            email: None,
            weight: None,
            height: None,
            created_at: None,
            last_updated: None,
            extra: Map::new(),
        }
    }

    /// BMI derived from the stored weight and height, if both are usable.
    pub fn bmi(&self) -> Option<String> {
        crate::validator::compute_bmi(self.weight, self.height)
    }

    /// Parsed creation time.
    pub fn created_time(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    /// Parsed last-update time.
    pub fn updated_time(&self) -> Option<DateTime<Utc>> {
        self.last_updated.as_deref().and_then(parse_timestamp)
    }
}

/// Current time as an ISO-8601 UTC string with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Text fields stored as `null` read as blank.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts ages stored as numbers or numeric strings (form inputs often
/// arrive as text). Anything else reads as 0 so the record still loads.
fn lenient_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let age = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(age.and_then(|a| u32::try_from(a).ok()).unwrap_or(0))
}

/// Weight/height stored as numbers or numeric strings. Blank or
/// non-numeric values read as `None`.
fn lenient_measure<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
