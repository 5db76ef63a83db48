//! Strict decoding of nutrition lookup responses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lookup errors.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Lookup request failed: {0}")]
    Http(String),

    #[error("Lookup service returned status {0}")]
    Status(u16),

    #[error("Malformed lookup response: {0}")]
    MalformedResponse(String),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// Top-level response body.
#[derive(Debug, Clone, Deserialize)]
struct LookupResponse {
    items: Vec<NutritionFacts>,
}

/// One item as returned by the nutrition service.
///
/// Every field is required. Extra fields (sugar, sodium, ...) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionFacts {
    pub name: String,
    pub serving_size_g: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub carbohydrates_total_g: f64,
    pub fat_total_g: f64,
}

/// A lookup result in meal-plan format: a display label and rounded quantities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoodMatch {
    pub label: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl NutritionFacts {
    /// Display label, e.g. "100g chicken breast".
    pub fn label(&self) -> String {
        format!("{}g {}", self.serving_size_g, self.name)
    }

    /// Convert to a meal-plan row, rounding each quantity to the nearest integer.
    pub fn to_food_match(&self) -> FoodMatch {
        FoodMatch {
            label: self.label(),
            calories: round_quantity(self.calories),
            protein: round_quantity(self.protein_g),
            carbs: round_quantity(self.carbohydrates_total_g),
            fat: round_quantity(self.fat_total_g),
        }
    }

    fn check(&self) -> LookupResult<()> {
        let fields = [
            ("serving_size_g", self.serving_size_g),
            ("calories", self.calories),
            ("protein_g", self.protein_g),
            ("carbohydrates_total_g", self.carbohydrates_total_g),
            ("fat_total_g", self.fat_total_g),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(LookupError::MalformedResponse(format!(
                    "{} has invalid {}: {}",
                    self.name, field, value
                )));
            }
        }
        let quantities = [
            ("calories", self.calories),
            ("protein_g", self.protein_g),
            ("carbohydrates_total_g", self.carbohydrates_total_g),
            ("fat_total_g", self.fat_total_g),
        ];
        for (field, value) in quantities {
            if value.round() > f64::from(u32::MAX) {
                return Err(LookupError::MalformedResponse(format!(
                    "{} has out-of-range {}: {}",
                    self.name, field, value
                )));
            }
        }
        if self.name.trim().is_empty() {
            return Err(LookupError::MalformedResponse("item without a name".into()));
        }
        Ok(())
    }
}

/// Parse a response body. Anything other than a well-formed `items` array fails.
pub fn parse_lookup_response(body: &str) -> LookupResult<Vec<NutritionFacts>> {
    let response: LookupResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::MalformedResponse(e.to_string()))?;

    for item in &response.items {
        item.check()?;
    }

    Ok(response.items)
}

/// Round half away from zero. Inputs are checked to be non-negative and to fit in `u32`.
fn round_quantity(value: f64) -> u32 {
    value.round() as u32
}
