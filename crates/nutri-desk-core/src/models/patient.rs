//! Patient models.

use serde::{Deserialize, Serialize};

use crate::metrics::BodyMetrics;

/// Gender as captured by the intake form. Selects the body-fat formula variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Form label ("Male" / "Female").
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    /// Parse a form label. Matching is exact and case-sensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// Validated intake data, ready to become a [`Patient`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub neck_in: f64,
    pub chest_in: Option<f64>,
    pub waist_in: f64,
    pub hips_in: Option<f64>,
    pub conditions: String,
    pub allergies: String,
}

/// A patient record.
///
/// `bmi` and `bfp` are computed once from the baseline measurements at
/// creation and never rewritten. See [`crate::metrics::current_metrics`] for
/// values derived from later measurements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Local UUID
    pub patient_id: String,
    /// Display name
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    /// Weight at intake in kg
    pub initial_weight_kg: f64,
    /// Height in cm
    pub height_cm: f64,
    /// Circumferences in inches
    pub neck_in: f64,
    pub chest_in: Option<f64>,
    pub waist_in: f64,
    pub hips_in: Option<f64>,
    /// Free-text medical conditions
    pub conditions: String,
    /// Free-text allergies
    pub allergies: String,
    /// Body-mass index at intake
    pub bmi: f64,
    /// Body-fat percentage estimate at intake
    pub bfp: f64,
    /// Creation timestamp
    pub created_at: String,
}

impl Patient {
    /// Create a patient from validated intake data, deriving baseline metrics.
    pub fn new(intake: NewPatient) -> Self {
        let metrics = BodyMetrics::from_anthropometrics(
            intake.gender.as_str(),
            intake.weight_kg,
            intake.height_cm,
            intake.neck_in,
            intake.waist_in,
            intake.hips_in.unwrap_or(0.0),
        );

        Self {
            patient_id: uuid::Uuid::new_v4().to_string(),
            name: intake.name,
            age: intake.age,
            gender: intake.gender,
            initial_weight_kg: intake.weight_kg,
            height_cm: intake.height_cm,
            neck_in: intake.neck_in,
            chest_in: intake.chest_in,
            waist_in: intake.waist_in,
            hips_in: intake.hips_in,
            conditions: intake.conditions,
            allergies: intake.allergies,
            bmi: metrics.bmi,
            bfp: metrics.bfp,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Baseline metrics frozen at intake.
    pub fn baseline_metrics(&self) -> BodyMetrics {
        BodyMetrics {
            bmi: self.bmi,
            bfp: self.bfp,
        }
    }
}
