//! Body composition metrics.
//!
//! Pure functions over numeric inputs. The body-fat estimate uses the
//! circumference method: log10 of a circumference difference (male) or
//! sum (female) and of height in inches.
//!
//! `compute_bfp` does not guard the logarithm's domain. Inputs with
//! waist <= neck (male) or waist + hips <= neck (female) yield a non-finite
//! result. Validation rejects those inputs before they reach storage, see
//! [`bfp_domain_ok`].

mod progress;

pub use progress::*;

use serde::{Deserialize, Serialize};

/// Centimeters per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Body-mass index: weight in kg over height in meters squared.
///
/// Returns 0 when `height_cm <= 0`.
#[uniffi::export]
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if height_cm <= 0.0 {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Body-fat percentage estimate.
///
/// `gender` must be exactly `"Male"` or `"Female"`; any other label returns 0.
/// `hips_in` is only used by the female variant.
#[uniffi::export]
pub fn compute_bfp(gender: &str, height_cm: f64, neck_in: f64, waist_in: f64, hips_in: f64) -> f64 {
    let height_in = height_cm / CM_PER_INCH;
    match gender {
        "Male" => 86.010 * (waist_in - neck_in).log10() - 70.041 * height_in.log10() + 36.76,
        "Female" => {
            163.205 * (waist_in + hips_in - neck_in).log10() - 97.684 * height_in.log10() - 78.387
        }
        _ => 0.0,
    }
}

/// Whether the body-fat formula is defined for these circumferences.
///
/// Unknown genders are always in domain since they short-circuit to 0.
pub fn bfp_domain_ok(gender: &str, neck_in: f64, waist_in: f64, hips_in: f64) -> bool {
    match gender {
        "Male" => waist_in - neck_in > 0.0,
        "Female" => waist_in + hips_in - neck_in > 0.0,
        _ => true,
    }
}

/// BMI and BFP computed together.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BodyMetrics {
    pub bmi: f64,
    pub bfp: f64,
}

impl BodyMetrics {
    pub fn from_anthropometrics(
        gender: &str,
        weight_kg: f64,
        height_cm: f64,
        neck_in: f64,
        waist_in: f64,
        hips_in: f64,
    ) -> Self {
        Self {
            bmi: compute_bmi(weight_kg, height_cm),
            bfp: compute_bfp(gender, height_cm, neck_in, waist_in, hips_in),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi() {
        assert!((compute_bmi(70.0, 175.0) - 22.857142857142858).abs() < 1e-12);
    }

    #[test]
    fn test_bmi_zero_height() {
        assert_eq!(compute_bmi(70.0, 0.0), 0.0);
        assert_eq!(compute_bmi(70.0, -10.0), 0.0);
    }

    #[test]
    fn test_bfp_male_golden() {
        let bfp = compute_bfp("Male", 180.0, 15.0, 34.0, 0.0);
        assert!((bfp - 17.13901403378923).abs() < 1e-9);
        assert_eq!(bfp, compute_bfp("Male", 180.0, 15.0, 34.0, 0.0));
    }

    #[test]
    fn test_bfp_female_golden() {
        let bfp = compute_bfp("Female", 165.0, 12.0, 30.0, 38.0);
        assert!((bfp - 29.859102115257798).abs() < 1e-9);
    }

    #[test]
    fn test_bfp_unknown_gender() {
        assert_eq!(compute_bfp("Other", 180.0, 15.0, 34.0, 0.0), 0.0);
        assert_eq!(compute_bfp("male", 180.0, 15.0, 34.0, 0.0), 0.0);
    }

    #[test]
    fn test_bfp_outside_log_domain_is_not_finite() {
        assert!(!compute_bfp("Male", 180.0, 15.0, 15.0, 0.0).is_finite());
        assert!(!compute_bfp("Male", 180.0, 16.0, 15.0, 0.0).is_finite());
        assert!(!bfp_domain_ok("Male", 15.0, 15.0, 0.0));
        assert!(bfp_domain_ok("Female", 15.0, 10.0, 6.0));
        assert!(!bfp_domain_ok("Female", 15.0, 10.0, 5.0));
    }
}
