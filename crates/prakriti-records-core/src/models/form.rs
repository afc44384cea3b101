//! Patient intake form payload.

use serde::{Deserialize, Serialize};

use super::PatientRecord;
use crate::validator::{validate, IdStrategy};

/// Loosely-typed intake form as submitted by the UI.
///
/// Every field may be blank; [`validate`] decides what is acceptable and
/// [`PatientForm::into_record`] turns an acceptable form into a
/// [`PatientRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientForm {
    /// Present when editing an existing record
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

impl PatientForm {
    /// Validate and convert into a record.
    ///
    /// A form without a `patient_id` gets a fresh one from `ids`. Blank
    /// optional strings become `None`.
    pub fn into_record(self, ids: IdStrategy) -> Result<PatientRecord, Vec<String>> {
        let errors = validate(&self);
        if !errors.is_empty() {
            return Err(errors);
        }

        let patient_id = self
            .patient_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| ids.generate());

        // validate() guarantees 1..=150
        let age = self.age.and_then(|a| u32::try_from(a).ok()).unwrap_or_default();

        let mut record = PatientRecord::new(
            patient_id,
            self.full_name.trim().to_string(),
            age,
            self.gender,
            self.contact_number.trim().to_string(),
            self.prakriti_type,
        );
        record.email = self.email.filter(|e| !e.is_empty());
        record.weight = self.weight;
        record.height = self.height;
        Ok(record)
    }
}

impl From<&PatientRecord> for PatientForm {
    fn from(record: &PatientRecord) -> Self {
        Self {
            patient_id: Some(record.patient_id.clone()),
            full_name: record.full_name.clone(),
            age: Some(i64::from(record.age)),
            gender: record.gender.clone(),
            contact_number: record.contact_number.clone(),
            prakriti_type: record.prakriti_type.clone(),
            email: record.email.clone(),
            weight: record.weight,
            height: record.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> PatientForm {
        PatientForm {
            patient_id: None,
            full_name: "  Ravi Kumar ".into(),
            age: Some(45),
            gender: "Male".into(),
            contact_number: "+91-9876543210".into(),
            prakriti_type: "Pitta".into(),
            email: Some(String::new()),
            weight: Some(72.5),
            height: Some(170.0),
        }
    }

    #[test]
    fn test_into_record_assigns_id() {
        let record = valid_form().into_record(IdStrategy::Timestamped).unwrap();
        assert!(record.patient_id.starts_with("PAT-"));
        assert_eq!(record.full_name, "Ravi Kumar");
        assert_eq!(record.age, 45);
        // Blank email is dropped
        assert_eq!(record.email, None);
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_into_record_keeps_existing_id() {
        let mut form = valid_form();
        form.patient_id = Some("PAT-42-7".into());
        let record = form.into_record(IdStrategy::Uuid).unwrap();
        assert_eq!(record.patient_id, "PAT-42-7");
    }

    #[test]
    fn test_into_record_rejects_invalid() {
        let mut form = valid_form();
        form.age = Some(0);
        form.gender = String::new();

        let errors = form.into_record(IdStrategy::Timestamped).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_deserialize_partial_form() {
        let form: PatientForm =
            serde_json::from_str(r#"{"fullName":"Meera","age":29}"#).unwrap();
        assert_eq!(form.full_name, "Meera");
        assert_eq!(form.age, Some(29));
        assert!(form.gender.is_empty());
    }
}
