//! Body measurement models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Validated measurement entry, ready to append to a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMeasurement {
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub neck_in: Option<f64>,
    pub chest_in: Option<f64>,
    pub waist_in: Option<f64>,
    pub hips_in: Option<f64>,
}

/// A dated weight/circumference snapshot owned by one patient.
///
/// Measurements are append-only. Several may share a date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    pub measurement_id: String,
    pub patient_id: String,
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub neck_in: Option<f64>,
    pub chest_in: Option<f64>,
    pub waist_in: Option<f64>,
    pub hips_in: Option<f64>,
    pub created_at: String,
}

impl Measurement {
    /// Create a measurement for a patient.
    pub fn new(patient_id: String, entry: NewMeasurement) -> Self {
        Self {
            measurement_id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            date: entry.date,
            weight_kg: entry.weight_kg,
            neck_in: entry.neck_in,
            chest_in: entry.chest_in,
            waist_in: entry.waist_in,
            hips_in: entry.hips_in,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Date as `YYYY-MM-DD`.
    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}
