//! Intake, measurement and manual food forms.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    non_blank, non_negative, required_non_negative, required_positive,
    required_text, ValidationError, ValidationResult,
};
use crate::metrics::bfp_domain_ok;
use crate::models::{FoodItem, Gender, NewMeasurement, NewPatient};

/// New-patient form as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientIntake {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub weight_kg: String,
    pub height_cm: String,
    pub neck_in: String,
    pub chest_in: String,
    pub waist_in: String,
    pub hips_in: String,
    pub conditions: String,
    pub allergies: String,
}

impl PatientIntake {
    /// Check the form and produce a patient ready to create.
    ///
    /// Hips are required for female patients. Circumferences must leave the
    /// body-fat formula defined.
    pub fn validate(&self) -> ValidationResult<NewPatient> {
        let name = required_text("name", &self.name)?;

        let gender_label = non_blank(&self.gender).ok_or(ValidationError::MissingField("gender"))?;
        let gender = Gender::from_label(gender_label)
            .ok_or_else(|| ValidationError::UnknownGender(gender_label.to_string()))?;

        let age = parse_age(&self.age)?;
        let weight_kg = required_positive("weight", &self.weight_kg)?;
        let height_cm = required_positive("height", &self.height_cm)?;
        let neck_in = required_non_negative("neck", &self.neck_in)?;
        let waist_in = required_non_negative("waist", &self.waist_in)?;
        let chest_in = optional_non_negative("chest", &self.chest_in)?;

        let hips_in = match gender {
            Gender::Female => Some(required_non_negative("hips", &self.hips_in)?),
            Gender::Male => optional_non_negative("hips", &self.hips_in)?,
        };

        if !bfp_domain_ok(gender.as_str(), neck_in, waist_in, hips_in.unwrap_or(0.0)) {
            return Err(ValidationError::CircumferenceDomain(match gender {
                Gender::Male => "waist must be larger than neck",
                Gender::Female => "waist plus hips must be larger than neck",
            }));
        }

        Ok(NewPatient {
            name,
            age,
            gender,
            weight_kg,
            height_cm,
            neck_in,
            chest_in,
            waist_in,
            hips_in,
            conditions: self.conditions.trim().to_string(),
            allergies: self.allergies.trim().to_string(),
        })
    }
}

fn parse_age(value: &str) -> ValidationResult<u32> {
    let raw = non_blank(value).ok_or(ValidationError::MissingField("age"))?;
    let n = non_negative("age", raw)?;
    if n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return Err(ValidationError::OutOfRange {
            field: "age",
            reason: "must be a whole number".into(),
        });
    }
    Ok(n as u32)
}

/// Blank means absent.
fn optional_non_negative(field: &'static str, value: &str) -> ValidationResult<Option<f64>> {
    non_blank(value).map(|v| non_negative(field, v)).transpose()
}

/// Measurement form as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeasurementEntry {
    /// `YYYY-MM-DD`
    pub date: String,
    pub weight_kg: String,
    pub neck_in: String,
    pub chest_in: String,
    pub waist_in: String,
    pub hips_in: String,
}

impl MeasurementEntry {
    /// Date and weight are required. Circumferences left blank or zero are
    /// recorded as absent.
    pub fn validate(&self) -> ValidationResult<NewMeasurement> {
        let raw_date = non_blank(&self.date).ok_or(ValidationError::MissingField("date"))?;
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(raw_date.to_string()))?;

        Ok(NewMeasurement {
            date,
            weight_kg: required_positive("weight", &self.weight_kg)?,
            neck_in: optional_circumference("neck", &self.neck_in)?,
            chest_in: optional_circumference("chest", &self.chest_in)?,
            waist_in: optional_circumference("waist", &self.waist_in)?,
            hips_in: optional_circumference("hips", &self.hips_in)?,
        })
    }
}

fn optional_circumference(field: &'static str, value: &str) -> ValidationResult<Option<f64>> {
    Ok(optional_non_negative(field, value)?.filter(|v| *v > 0.0))
}

/// Manual food entry as typed by the practitioner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualFoodEntry {
    pub label: String,
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
}

impl ManualFoodEntry {
    pub fn validate(&self) -> ValidationResult<FoodItem> {
        FoodItem::from_manual(self)
    }
}

impl FoodItem {
    /// Build an item from a manual entry. Blank quantities count as zero and
    /// every quantity is rounded to the nearest whole number.
    pub fn from_manual(entry: &ManualFoodEntry) -> ValidationResult<FoodItem> {
        Ok(FoodItem {
            label: required_text("label", &entry.label)?,
            calories: quantity("calories", &entry.calories)?,
            protein: quantity("protein", &entry.protein)?,
            carbs: quantity("carbs", &entry.carbs)?,
            fat: quantity("fat", &entry.fat)?,
        })
    }
}

fn quantity(field: &'static str, value: &str) -> ValidationResult<u32> {
    let Some(raw) = non_blank(value) else {
        return Ok(0);
    };
    let rounded = non_negative(field, raw)?.round();
    if rounded > f64::from(u32::MAX) {
        return Err(ValidationError::OutOfRange {
            field,
            reason: "too large".into(),
        });
    }
    Ok(rounded as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake() -> PatientIntake {
        PatientIntake {
            name: " Jane Doe ".into(),
            age: "34".into(),
            gender: "Female".into(),
            weight_kg: "68".into(),
            height_cm: "165".into(),
            neck_in: "12".into(),
            chest_in: "".into(),
            waist_in: "30".into(),
            hips_in: "38".into(),
            conditions: "".into(),
            allergies: "Peanuts".into(),
        }
    }

    #[test]
    fn test_valid_intake() {
        let patient = intake().validate().unwrap();
        assert_eq!(patient.name, "Jane Doe");
        assert_eq!(patient.age, 34);
        assert_eq!(patient.gender, Gender::Female);
        assert_eq!(patient.chest_in, None);
        assert_eq!(patient.hips_in, Some(38.0));
    }

    #[test]
    fn test_female_requires_hips() {
        let mut form = intake();
        form.hips_in = "  ".into();
        assert_eq!(form.validate(), Err(ValidationError::MissingField("hips")));

        form.gender = "Male".into();
        form.waist_in = "34".into();
        assert_eq!(form.validate().unwrap().hips_in, None);
    }

    #[test]
    fn test_missing_and_malformed_fields() {
        let mut form = intake();
        form.name = "".into();
        assert_eq!(form.validate(), Err(ValidationError::MissingField("name")));

        let mut form = intake();
        form.weight_kg = "sixty".into();
        assert!(matches!(
            form.validate(),
            Err(ValidationError::NotANumber { field: "weight", .. })
        ));

        let mut form = intake();
        form.age = "34.5".into();
        assert!(matches!(
            form.validate(),
            Err(ValidationError::OutOfRange { field: "age", .. })
        ));

        let mut form = intake();
        form.gender = "female".into();
        assert!(matches!(form.validate(), Err(ValidationError::UnknownGender(_))));
    }

    #[test]
    fn test_rejects_log_domain_violation() {
        let mut form = intake();
        form.gender = "Male".into();
        form.neck_in = "15".into();
        form.waist_in = "15".into();
        assert!(matches!(
            form.validate(),
            Err(ValidationError::CircumferenceDomain(_))
        ));
    }

    #[test]
    fn test_measurement_entry() {
        let entry = MeasurementEntry {
            date: "2024-03-01".into(),
            weight_kg: "66.4".into(),
            neck_in: "".into(),
            chest_in: "0".into(),
            waist_in: "29".into(),
            hips_in: "".into(),
        };
        let m = entry.validate().unwrap();
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(m.weight_kg, 66.4);
        assert_eq!(m.chest_in, None);
        assert_eq!(m.waist_in, Some(29.0));
    }

    #[test]
    fn test_measurement_requires_date_and_weight() {
        let entry = MeasurementEntry {
            weight_kg: "66".into(),
            ..Default::default()
        };
        assert_eq!(entry.validate(), Err(ValidationError::MissingField("date")));

        let entry = MeasurementEntry {
            date: "03/01/2024".into(),
            weight_kg: "66".into(),
            ..Default::default()
        };
        assert!(matches!(entry.validate(), Err(ValidationError::InvalidDate(_))));

        let entry = MeasurementEntry {
            date: "2024-03-01".into(),
            ..Default::default()
        };
        assert_eq!(entry.validate(), Err(ValidationError::MissingField("weight")));
    }

    #[test]
    fn test_manual_food_blank_is_zero_and_rounds() {
        let entry = ManualFoodEntry {
            label: "Homemade granola".into(),
            calories: "210.6".into(),
            protein: "".into(),
            carbs: "30.4".into(),
            fat: "7.5".into(),
        };
        let item = entry.validate().unwrap();
        assert_eq!(item, FoodItem::new("Homemade granola", 211, 0, 30, 8));
    }

    #[test]
    fn test_manual_food_rejects_bad_values() {
        let mut entry = ManualFoodEntry {
            label: "".into(),
            ..Default::default()
        };
        assert_eq!(entry.validate(), Err(ValidationError::MissingField("label")));

        entry.label = "Tea".into();
        entry.calories = "-5".into();
        assert!(matches!(
            entry.validate(),
            Err(ValidationError::OutOfRange { field: "calories", .. })
        ));

        entry.calories = "lots".into();
        assert!(matches!(
            entry.validate(),
            Err(ValidationError::NotANumber { field: "calories", .. })
        ));
    }
}
