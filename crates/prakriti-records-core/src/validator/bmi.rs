//! Body-mass index derivation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// BMI band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Band for a BMI value. Each threshold belongs to the band above it.
    pub fn from_value(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute BMI from weight (kg) and height (cm).
///
/// Returns `None` when either input is missing, zero or NaN. The value is
/// rounded to one decimal and kept as a string so `"22.0"` keeps its
/// trailing zero.
pub fn compute_bmi(weight: Option<f64>, height_cm: Option<f64>) -> Option<String> {
    let weight = weight.filter(|w| is_usable(*w))?;
    let height_cm = height_cm.filter(|h| is_usable(*h))?;

    let height_m = height_cm / 100.0;
    let bmi = weight / (height_m * height_m);
    Some(format_one_decimal(bmi))
}

/// Category for a BMI string as produced by [`compute_bmi`].
///
/// Blank or non-numeric input yields `None`.
pub fn bmi_category(bmi: &str) -> Option<BmiCategory> {
    let value = bmi.trim().parse::<f64>().ok().filter(|v| !v.is_nan())?;
    Some(BmiCategory::from_value(value))
}

fn is_usable(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Half-away-from-zero rounding to one decimal place.
fn format_one_decimal(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    format!("{:.1}", rounded)
}
