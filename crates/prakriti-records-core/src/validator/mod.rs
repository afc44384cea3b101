//! Form validator: pure checks and derivations, no storage access.
//!
//! - Intake form rules (required fields, email and phone shape)
//! - BMI value and category
//! - Patient ID generation

mod bmi;
mod id;
mod rules;

pub use bmi::*;
pub use id::*;
pub use rules::*;
