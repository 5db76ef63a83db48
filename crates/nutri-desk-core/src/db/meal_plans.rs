//! Meal plan database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{MealPlan, NutritionTotals, SavedMealPlan};

impl Database {
    /// Append a saved plan.
    pub fn insert_meal_plan(&self, plan: &SavedMealPlan) -> DbResult<()> {
        let chart_json = serde_json::to_string(&plan.chart)?;
        let totals_json = serde_json::to_string(&plan.totals)?;

        self.conn.execute(
            r#"
            INSERT INTO meal_plans (
                plan_id, patient_id, chart, totals, notes, content_hash, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                plan.plan_id,
                plan.patient_id,
                chart_json,
                totals_json,
                plan.notes,
                plan.content_hash,
                plan.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a plan by ID.
    pub fn get_meal_plan(&self, plan_id: &str) -> DbResult<Option<SavedMealPlan>> {
        self.conn
            .query_row(
                r#"
                SELECT plan_id, patient_id, chart, totals, notes, content_hash, created_at
                FROM meal_plans
                WHERE plan_id = ?
                "#,
                [plan_id],
                MealPlanRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// The patient's most recent plan with this content hash.
    pub fn latest_meal_plan_with_hash(
        &self,
        patient_id: &str,
        content_hash: &str,
    ) -> DbResult<Option<SavedMealPlan>> {
        self.conn
            .query_row(
                r#"
                SELECT plan_id, patient_id, chart, totals, notes, content_hash, created_at
                FROM meal_plans
                WHERE patient_id = ?1 AND content_hash = ?2
                ORDER BY created_at DESC, rowid DESC
                LIMIT 1
                "#,
                params![patient_id, content_hash],
                MealPlanRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List a patient's plans, newest first.
    pub fn list_meal_plans(&self, patient_id: &str) -> DbResult<Vec<SavedMealPlan>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT plan_id, patient_id, chart, totals, notes, content_hash, created_at
            FROM meal_plans
            WHERE patient_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;

        let rows = stmt.query_map([patient_id], MealPlanRow::from_row)?;

        let mut plans = Vec::new();
        for row in rows {
            plans.push(row?.try_into()?);
        }
        Ok(plans)
    }
}

/// Intermediate row struct for database mapping.
struct MealPlanRow {
    plan_id: String,
    patient_id: String,
    chart: String,
    totals: String,
    notes: String,
    content_hash: String,
    created_at: String,
}

impl MealPlanRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            plan_id: row.get(0)?,
            patient_id: row.get(1)?,
            chart: row.get(2)?,
            totals: row.get(3)?,
            notes: row.get(4)?,
            content_hash: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl TryFrom<MealPlanRow> for SavedMealPlan {
    type Error = DbError;

    fn try_from(row: MealPlanRow) -> Result<Self, Self::Error> {
        let chart: MealPlan = serde_json::from_str(&row.chart)?;
        let totals: NutritionTotals = serde_json::from_str(&row.totals)?;

        Ok(SavedMealPlan {
            plan_id: row.plan_id,
            patient_id: row.patient_id,
            chart,
            totals,
            notes: row.notes,
            content_hash: row.content_hash,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_intake, FoodItem, NewMealPlan, Patient};
    use crate::plan::grand_totals;

    fn setup_db() -> (Database, Patient) {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new(sample_intake());
        db.insert_patient(&patient).unwrap();
        (db, patient)
    }

    fn saved_plan(patient_id: &str, hash: &str, created_at: &str) -> SavedMealPlan {
        let mut chart = MealPlan::new();
        chart.breakfast.push(FoodItem::new("100g oats", 389, 17, 66, 7));
        let totals = grand_totals(&chart);
        let mut plan = SavedMealPlan::new(
            NewMealPlan {
                patient_id: patient_id.into(),
                chart,
                totals,
                notes: "Drink water".into(),
            },
            hash.into(),
        );
        plan.created_at = created_at.into();
        plan
    }

    #[test]
    fn test_insert_and_get_plan() {
        let (db, patient) = setup_db();
        let plan = saved_plan(&patient.patient_id, "h1", "2024-01-01T00:00:00+00:00");

        db.insert_meal_plan(&plan).unwrap();

        let retrieved = db.get_meal_plan(&plan.plan_id).unwrap().unwrap();
        assert_eq!(retrieved, plan);
        assert_eq!(retrieved.totals.calories, 389);
    }

    #[test]
    fn test_same_content_is_appended() {
        let (db, patient) = setup_db();
        let first = saved_plan(&patient.patient_id, "same", "2024-01-01T00:00:00+00:00");
        let second = saved_plan(&patient.patient_id, "same", "2024-01-08T00:00:00+00:00");

        db.insert_meal_plan(&first).unwrap();
        db.insert_meal_plan(&second).unwrap();

        let latest = db
            .latest_meal_plan_with_hash(&patient.patient_id, "same")
            .unwrap()
            .unwrap();
        assert_eq!(latest.plan_id, second.plan_id);
        assert_eq!(db.list_meal_plans(&patient.patient_id).unwrap().len(), 2);
        assert!(db
            .latest_meal_plan_with_hash(&patient.patient_id, "other")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let (db, patient) = setup_db();
        let older = saved_plan(&patient.patient_id, "a", "2024-01-01T00:00:00+00:00");
        let newer = saved_plan(&patient.patient_id, "b", "2024-02-01T00:00:00+00:00");
        db.insert_meal_plan(&older).unwrap();
        db.insert_meal_plan(&newer).unwrap();

        let plans = db.list_meal_plans(&patient.patient_id).unwrap();
        assert_eq!(plans[0].plan_id, newer.plan_id);
        assert_eq!(plans[1].plan_id, older.plan_id);
    }

    #[test]
    fn test_cascade_on_patient_delete() {
        let (db, patient) = setup_db();
        let plan = saved_plan(&patient.patient_id, "h1", "2024-01-01T00:00:00+00:00");
        db.insert_meal_plan(&plan).unwrap();

        db.delete_patient(&patient.patient_id).unwrap();
        assert!(db.get_meal_plan(&plan.plan_id).unwrap().is_none());
    }
}
