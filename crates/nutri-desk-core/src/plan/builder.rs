//! Unsaved meal plan being assembled by the practitioner.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{grand_totals, totals, PlanError, PlanResult};
use crate::models::{FoodItem, Meal, MealPlan, NewMealPlan, NutritionTotals};

/// A working diet chart plus free-text notes.
///
/// Nothing here is persisted. `finish` produces the record to save; the
/// caller clears the builder once the save succeeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MealPlanBuilder {
    chart: MealPlan,
    notes: String,
}

impl MealPlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from an existing chart and notes.
    pub fn from_parts(chart: MealPlan, notes: impl Into<String>) -> Self {
        Self {
            chart,
            notes: notes.into(),
        }
    }

    pub fn chart(&self) -> &MealPlan {
        &self.chart
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Append an item to a meal. Duplicates are kept.
    pub fn add_food(&mut self, meal: Meal, item: FoodItem) {
        debug!(meal = meal.as_str(), label = %item.label, "Adding food");
        self.chart.items_mut(meal).push(item);
    }

    /// Remove the item at `index` from a meal, returning it.
    pub fn remove_food(&mut self, meal: Meal, index: usize) -> PlanResult<FoodItem> {
        let items = self.chart.items_mut(meal);
        if index >= items.len() {
            return Err(PlanError::NoSuchItem { meal, index });
        }
        Ok(items.remove(index))
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Subtotal for one meal.
    pub fn meal_totals(&self, meal: Meal) -> NutritionTotals {
        totals(self.chart.items(meal))
    }

    pub fn grand_totals(&self) -> NutritionTotals {
        grand_totals(&self.chart)
    }

    pub fn is_empty(&self) -> bool {
        self.chart.is_empty()
    }

    /// Build the record to save for `patient_id`.
    pub fn finish(&self, patient_id: &str) -> PlanResult<NewMealPlan> {
        if self.is_empty() {
            return Err(PlanError::EmptyPlan);
        }

        Ok(NewMealPlan {
            patient_id: patient_id.to_string(),
            chart: self.chart.clone(),
            totals: self.grand_totals(),
            notes: self.notes.clone(),
        })
    }

    /// Reset to an empty chart with no notes.
    pub fn clear(&mut self) {
        self.chart = MealPlan::new();
        self.notes.clear();
    }
}
