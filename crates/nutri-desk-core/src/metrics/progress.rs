//! Progress tracking derived from measurement history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{bfp_domain_ok, compute_bfp, compute_bmi};
use crate::models::{Measurement, Patient};

/// Metrics recomputed from the newest measurement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurrentMetrics {
    /// Date of the measurement used, `None` when falling back to intake values
    pub as_of: Option<NaiveDate>,
    pub weight_kg: f64,
    pub bmi: f64,
    /// `None` when the circumferences fall outside the formula's domain
    pub bfp: Option<f64>,
}

/// Recompute BMI and BFP from `latest`, or from the intake values if there
/// is no measurement yet.
///
/// Circumferences missing from the measurement fall back to the patient's
/// baseline values.
pub fn current_metrics(patient: &Patient, latest: Option<&Measurement>) -> CurrentMetrics {
    let gender = patient.gender.as_str();
    let Some(m) = latest else {
        return CurrentMetrics {
            as_of: None,
            weight_kg: patient.initial_weight_kg,
            bmi: patient.bmi,
            bfp: patient.bfp.is_finite().then_some(patient.bfp),
        };
    };

    let neck = m.neck_in.unwrap_or(patient.neck_in);
    let waist = m.waist_in.unwrap_or(patient.waist_in);
    let hips = m.hips_in.or(patient.hips_in).unwrap_or(0.0);

    let bfp = bfp_domain_ok(gender, neck, waist, hips)
        .then(|| compute_bfp(gender, patient.height_cm, neck, waist, hips));

    CurrentMetrics {
        as_of: Some(m.date),
        weight_kg: m.weight_kg,
        bmi: compute_bmi(m.weight_kg, patient.height_cm),
        bfp,
    }
}

/// Weight over time, ready for a line chart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeightSeries {
    /// Dates as `YYYY-MM-DD`
    pub labels: Vec<String>,
    pub weights: Vec<f64>,
}

impl WeightSeries {
    /// Build from measurements, sorted by date. Entries on the same date
    /// keep their input order.
    pub fn from_measurements(measurements: &[Measurement]) -> Self {
        let mut sorted: Vec<&Measurement> = measurements.iter().collect();
        sorted.sort_by_key(|m| m.date);

        Self {
            labels: sorted.iter().map(|m| m.date_label()).collect(),
            weights: sorted.iter().map(|m| m.weight_kg).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// A trend line needs at least two points.
    pub fn is_chartable(&self) -> bool {
        self.len() >= 2
    }

    /// Latest weight minus `initial_weight_kg`. `None` when there are no points.
    pub fn change_from_baseline(&self, initial_weight_kg: f64) -> Option<f64> {
        self.weights.last().map(|w| w - initial_weight_kg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_intake;
    use crate::models::NewMeasurement;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn measurement(patient: &Patient, day: &str, weight: f64) -> Measurement {
        Measurement::new(
            patient.patient_id.clone(),
            NewMeasurement {
                date: date(day),
                weight_kg: weight,
                neck_in: None,
                chest_in: None,
                waist_in: None,
                hips_in: None,
            },
        )
    }

    #[test]
    fn test_current_metrics_without_measurement() {
        let patient = Patient::new(sample_intake());
        let current = current_metrics(&patient, None);
        assert_eq!(current.as_of, None);
        assert_eq!(current.bmi, patient.bmi);
        assert_eq!(current.bfp, Some(patient.bfp));
    }

    #[test]
    fn test_current_metrics_uses_latest_weight() {
        let patient = Patient::new(sample_intake());
        let m = measurement(&patient, "2024-03-01", 65.0);

        let current = current_metrics(&patient, Some(&m));
        assert_eq!(current.as_of, Some(date("2024-03-01")));
        assert!((current.bmi - compute_bmi(65.0, 165.0)).abs() < 1e-12);
        // Circumferences fall back to baseline, so BFP is unchanged
        assert!((current.bfp.unwrap() - patient.bfp).abs() < 1e-12);
    }

    #[test]
    fn test_current_metrics_out_of_domain() {
        let patient = Patient::new(sample_intake());
        let mut m = measurement(&patient, "2024-03-01", 65.0);
        m.neck_in = Some(80.0);

        assert_eq!(current_metrics(&patient, Some(&m)).bfp, None);
    }

    #[test]
    fn test_weight_series_sorted_by_date() {
        let patient = Patient::new(sample_intake());
        let series = WeightSeries::from_measurements(&[
            measurement(&patient, "2024-02-01", 67.0),
            measurement(&patient, "2024-01-01", 68.0),
            measurement(&patient, "2024-03-01", 66.0),
        ]);

        assert_eq!(series.labels, vec!["2024-01-01", "2024-02-01", "2024-03-01"]);
        assert_eq!(series.weights, vec![68.0, 67.0, 66.0]);
        assert!(series.is_chartable());
        assert_eq!(series.change_from_baseline(68.0), Some(-2.0));
    }

    #[test]
    fn test_single_point_not_chartable() {
        let patient = Patient::new(sample_intake());
        let series = WeightSeries::from_measurements(&[measurement(&patient, "2024-01-01", 68.0)]);
        assert!(!series.is_chartable());
        assert!(WeightSeries::default().change_from_baseline(68.0).is_none());
    }
}
