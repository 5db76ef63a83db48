//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Gender, Patient};

const PATIENT_COLUMNS: &str = r#"
    patient_id, name, age, gender, initial_weight_kg, height_cm,
    neck_in, chest_in, waist_in, hips_in, conditions, allergies,
    bmi, bfp, created_at
"#;

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                patient_id, name, age, gender, initial_weight_kg, height_cm,
                neck_in, chest_in, waist_in, hips_in, conditions, allergies,
                bmi, bfp, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                patient.patient_id,
                patient.name,
                patient.age,
                patient.gender.as_str(),
                patient.initial_weight_kg,
                patient.height_cm,
                patient.neck_in,
                patient.chest_in,
                patient.waist_in,
                patient.hips_in,
                patient.conditions,
                patient.allergies,
                patient.bmi,
                patient.bfp,
                patient.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE patient_id = ?"),
                [patient_id],
                PatientRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List all patients, newest first.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map([], PatientRow::from_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// Delete a patient together with its measurements and meal plans.
    pub fn delete_patient(&self, patient_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE patient_id = ?", [patient_id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    patient_id: String,
    name: String,
    age: u32,
    gender: String,
    initial_weight_kg: f64,
    height_cm: f64,
    neck_in: f64,
    chest_in: Option<f64>,
    waist_in: f64,
    hips_in: Option<f64>,
    conditions: String,
    allergies: String,
    bmi: f64,
    bfp: f64,
    created_at: String,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            patient_id: row.get(0)?,
            name: row.get(1)?,
            age: row.get(2)?,
            gender: row.get(3)?,
            initial_weight_kg: row.get(4)?,
            height_cm: row.get(5)?,
            neck_in: row.get(6)?,
            chest_in: row.get(7)?,
            waist_in: row.get(8)?,
            hips_in: row.get(9)?,
            conditions: row.get(10)?,
            allergies: row.get(11)?,
            bmi: row.get(12)?,
            bfp: row.get(13)?,
            created_at: row.get(14)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let gender = Gender::from_label(&row.gender)
            .ok_or_else(|| DbError::Constraint(format!("Unknown gender: {}", row.gender)))?;

        Ok(Patient {
            patient_id: row.patient_id,
            name: row.name,
            age: row.age,
            gender,
            initial_weight_kg: row.initial_weight_kg,
            height_cm: row.height_cm,
            neck_in: row.neck_in,
            chest_in: row.chest_in,
            waist_in: row.waist_in,
            hips_in: row.hips_in,
            conditions: row.conditions,
            allergies: row.allergies,
            bmi: row.bmi,
            bfp: row.bfp,
            created_at: row.created_at,
        })
    }
}
