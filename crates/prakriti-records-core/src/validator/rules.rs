//! Intake form validation rules.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::PatientForm;

pub const FULL_NAME_REQUIRED: &str = "Full Name is required";
pub const VALID_AGE_REQUIRED: &str = "Valid age is required";
pub const GENDER_REQUIRED: &str = "Gender is required";
pub const CONTACT_NUMBER_REQUIRED: &str = "Contact Number is required";
pub const PRAKRITI_TYPE_REQUIRED: &str = "Prakriti Type is required";
pub const INVALID_EMAIL: &str = "Valid email format is required";
pub const INVALID_PHONE: &str = "Valid phone number format is required";

/// Accepted age range, inclusive.
pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 150;

/// Check a form and return every failing rule's message, in rule order.
///
/// An empty result means the form can be saved.
pub fn validate(form: &PatientForm) -> Vec<String> {
    let mut errors = Vec::new();

    if form.full_name.trim().is_empty() {
        errors.push(FULL_NAME_REQUIRED.to_string());
    }
    if !form.age.is_some_and(|age| (MIN_AGE..=MAX_AGE).contains(&age)) {
        errors.push(VALID_AGE_REQUIRED.to_string());
    }
    if form.gender.is_empty() {
        errors.push(GENDER_REQUIRED.to_string());
    }
    if form.contact_number.trim().is_empty() {
        errors.push(CONTACT_NUMBER_REQUIRED.to_string());
    }
    if form.prakriti_type.is_empty() {
        errors.push(PRAKRITI_TYPE_REQUIRED.to_string());
    }

    if let Some(email) = form.email.as_deref().filter(|e| !e.is_empty()) {
        if !is_valid_email(email) {
            errors.push(INVALID_EMAIL.to_string());
        }
    }

    // Untrimmed: a whitespace-only number fails both checks.
    if !form.contact_number.is_empty() && !is_valid_phone(&form.contact_number) {
        errors.push(INVALID_PHONE.to_string());
    }

    errors
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"))
        .is_match(email)
}

/// At least 10 characters of digits, spaces, `-`, `(`, `)`, with an
/// optional leading `+`. Digit count is not checked.
pub fn is_valid_phone(phone: &str) -> bool {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE
        .get_or_init(|| Regex::new(r"^\+?[0-9\s\-()]{10,}$").expect("phone pattern"))
        .is_match(phone)
}
