//! Meal plan (diet chart) models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::food::{FoodItem, NutritionTotals};

/// The four fixed daily meal categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

impl Meal {
    /// All meals in display order.
    pub const ALL: [Meal; 4] = [Meal::Breakfast, Meal::Lunch, Meal::Snacks, Meal::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Meal::Breakfast => "breakfast",
            Meal::Lunch => "lunch",
            Meal::Snacks => "snacks",
            Meal::Dinner => "dinner",
        }
    }

    /// Heading used in views and exported documents.
    pub fn title(&self) -> &'static str {
        match self {
            Meal::Breakfast => "Breakfast",
            Meal::Lunch => "Lunch",
            Meal::Snacks => "Snacks",
            Meal::Dinner => "Dinner",
        }
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Meal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(Meal::Breakfast),
            "lunch" => Ok(Meal::Lunch),
            "snacks" => Ok(Meal::Snacks),
            "dinner" => Ok(Meal::Dinner),
            other => Err(format!("Unknown meal: {}", other)),
        }
    }
}

/// Food items assigned to each meal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MealPlan {
    pub breakfast: Vec<FoodItem>,
    pub lunch: Vec<FoodItem>,
    pub snacks: Vec<FoodItem>,
    pub dinner: Vec<FoodItem>,
}

impl MealPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items for one meal.
    pub fn items(&self, meal: Meal) -> &[FoodItem] {
        match meal {
            Meal::Breakfast => &self.breakfast,
            Meal::Lunch => &self.lunch,
            Meal::Snacks => &self.snacks,
            Meal::Dinner => &self.dinner,
        }
    }

    /// Mutable items for one meal.
    pub fn items_mut(&mut self, meal: Meal) -> &mut Vec<FoodItem> {
        match meal {
            Meal::Breakfast => &mut self.breakfast,
            Meal::Lunch => &mut self.lunch,
            Meal::Snacks => &mut self.snacks,
            Meal::Dinner => &mut self.dinner,
        }
    }

    /// Meals paired with their items, in display order.
    pub fn meals(&self) -> impl Iterator<Item = (Meal, &[FoodItem])> {
        Meal::ALL.into_iter().map(move |meal| (meal, self.items(meal)))
    }

    /// Every item across all meals.
    pub fn all_items(&self) -> impl Iterator<Item = &FoodItem> {
        self.meals().flat_map(|(_, items)| items.iter())
    }

    /// Total number of food lines.
    pub fn item_count(&self) -> usize {
        self.meals().map(|(_, items)| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }
}

/// A finished plan ready to be saved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMealPlan {
    pub patient_id: String,
    pub chart: MealPlan,
    pub totals: NutritionTotals,
    pub notes: String,
}

/// A saved meal plan. Saved plans are never edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedMealPlan {
    pub plan_id: String,
    pub patient_id: String,
    pub chart: MealPlan,
    pub totals: NutritionTotals,
    pub notes: String,
    /// SHA-256 of the plan content, used to detect duplicate saves
    pub content_hash: String,
    pub created_at: String,
}

impl SavedMealPlan {
    /// Create a saved plan record from a finished plan and its fingerprint.
    pub fn new(plan: NewMealPlan, content_hash: String) -> Self {
        Self {
            plan_id: uuid::Uuid::new_v4().to_string(),
            patient_id: plan.patient_id,
            chart: plan.chart,
            totals: plan.totals,
            notes: plan.notes,
            content_hash,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
