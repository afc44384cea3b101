//! Domain models for patient intake records.

mod form;
mod patient;

pub use form::*;
pub use patient::*;
