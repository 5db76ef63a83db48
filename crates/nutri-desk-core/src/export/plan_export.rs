//! JSON and CSV export of saved meal plans.

use serde::{Deserialize, Serialize};

use crate::models::{NutritionTotals, SavedMealPlan};

/// A saved plan flattened for external tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanExport {
    /// Export metadata
    pub metadata: PlanExportMetadata,
    /// One line per food item
    pub line_items: Vec<PlanLineItem>,
    /// Plan totals
    pub totals: NutritionTotals,
}

/// Meal plan export metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanExportMetadata {
    pub plan_id: String,
    pub patient_id: String,
    pub patient_name: String,
    /// When the plan was saved
    pub created_at: String,
    /// When this export was produced
    pub exported_at: String,
    pub notes: String,
}

/// Single food line with its meal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanLineItem {
    pub meal: String,
    pub label: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl MealPlanExport {
    pub fn from_plan(plan: &SavedMealPlan, patient_name: &str) -> Self {
        let line_items = plan
            .chart
            .meals()
            .flat_map(|(meal, items)| {
                items.iter().map(move |item| PlanLineItem {
                    meal: meal.as_str().to_string(),
                    label: item.label.clone(),
                    calories: item.calories,
                    protein: item.protein,
                    carbs: item.carbs,
                    fat: item.fat,
                })
            })
            .collect();

        Self {
            metadata: PlanExportMetadata {
                plan_id: plan.plan_id.clone(),
                patient_id: plan.patient_id.clone(),
                patient_name: patient_name.to_string(),
                created_at: plan.created_at.clone(),
                exported_at: chrono::Utc::now().to_rfc3339(),
                notes: plan.notes.clone(),
            },
            line_items,
            totals: plan.totals,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("plan_id,patient_name,created_at,meal,food_item,calories,protein_g,carbs_g,fat_g\n");

        for item in &self.line_items {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                escape_csv(&self.metadata.plan_id),
                escape_csv(&self.metadata.patient_name),
                escape_csv(&self.metadata.created_at),
                item.meal,
                escape_csv(&item.label),
                item.calories,
                item.protein,
                item.carbs,
                item.fat,
            ));
        }

        csv
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodItem, MealPlan, NewMealPlan};
    use crate::plan::grand_totals;

    fn make_plan() -> SavedMealPlan {
        let mut chart = MealPlan::new();
        chart.breakfast.push(FoodItem::new("100g oats", 389, 17, 66, 7));
        chart.dinner.push(FoodItem::new("rice, steamed", 130, 3, 28, 0));
        chart.dinner.push(FoodItem::new("1 \"large\" egg", 72, 6, 0, 5));
        let totals = grand_totals(&chart);
        SavedMealPlan::new(
            NewMealPlan {
                patient_id: "patient-1".into(),
                chart,
                totals,
                notes: "Drink water".into(),
            },
            "hash".into(),
        )
    }

    #[test]
    fn test_line_items_follow_meal_order() {
        let export = MealPlanExport::from_plan(&make_plan(), "Jane Doe");
        let meals: Vec<&str> = export.line_items.iter().map(|l| l.meal.as_str()).collect();
        assert_eq!(meals, vec!["breakfast", "dinner", "dinner"]);
        assert_eq!(export.totals.calories, 591);
    }

    #[test]
    fn test_plan_export_json() {
        let json = MealPlanExport::from_plan(&make_plan(), "Jane Doe")
            .to_json()
            .unwrap();
        assert!(json.contains("100g oats"));
        assert!(json.contains("Jane Doe"));
    }

    #[test]
    fn test_plan_export_csv() {
        let csv = MealPlanExport::from_plan(&make_plan(), "Jane Doe").to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4); // Header + 3 items
        assert!(lines[0].starts_with("plan_id,"));
        assert!(lines[2].contains(",dinner,\"rice, steamed\",130,3,28,0"));
        assert!(lines[3].contains("\"1 \"\"large\"\" egg\""));
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }
}
