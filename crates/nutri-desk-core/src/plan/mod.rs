//! Meal-plan aggregation.
//!
//! Pipeline: Lookup / Manual entry → FoodItem (rounded) → MealPlanBuilder → NewMealPlan

mod builder;
mod fingerprint;

pub use builder::*;
pub use fingerprint::*;

use crate::models::{FoodItem, Meal, MealPlan, NutritionTotals};
use thiserror::Error;

/// Meal-plan errors.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Cannot save an empty diet chart.")]
    EmptyPlan,

    #[error("No item {index} in {meal}")]
    NoSuchItem { meal: Meal, index: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type PlanResult<T> = Result<T, PlanError>;

/// Sum each nutrition field over `items`. Empty input gives all zeros.
pub fn totals<'a, I>(items: I) -> NutritionTotals
where
    I: IntoIterator<Item = &'a FoodItem>,
{
    items.into_iter().map(NutritionTotals::of).sum()
}

/// Totals across every meal of a chart.
pub fn grand_totals(plan: &MealPlan) -> NutritionTotals {
    totals(plan.all_items())
}
