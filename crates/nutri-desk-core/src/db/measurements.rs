//! Measurement database operations.

use chrono::NaiveDate;
use rusqlite::{params, Row};

use super::{Database, DbError, DbResult};
use crate::models::Measurement;

const DATE_FORMAT: &str = "%Y-%m-%d";

impl Database {
    /// Append a measurement.
    pub fn insert_measurement(&self, measurement: &Measurement) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO measurements (
                measurement_id, patient_id, date, weight_kg,
                neck_in, chest_in, waist_in, hips_in, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                measurement.measurement_id,
                measurement.patient_id,
                measurement.date_label(),
                measurement.weight_kg,
                measurement.neck_in,
                measurement.chest_in,
                measurement.waist_in,
                measurement.hips_in,
                measurement.created_at,
            ],
        )?;
        Ok(())
    }

    /// Measurements for a patient by date, oldest first. Entries sharing a
    /// date keep insertion order.
    pub fn list_measurements(&self, patient_id: &str) -> DbResult<Vec<Measurement>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT measurement_id, patient_id, date, weight_kg,
                   neck_in, chest_in, waist_in, hips_in, created_at
            FROM measurements
            WHERE patient_id = ?
            ORDER BY date ASC, rowid ASC
            "#,
        )?;

        let rows = stmt.query_map([patient_id], MeasurementRow::from_row)?;

        let mut measurements = Vec::new();
        for row in rows {
            measurements.push(row?.try_into()?);
        }
        Ok(measurements)
    }

    /// Most recent measurement by date.
    pub fn latest_measurement(&self, patient_id: &str) -> DbResult<Option<Measurement>> {
        Ok(self.list_measurements(patient_id)?.pop())
    }
}

/// Intermediate row struct for database mapping.
struct MeasurementRow {
    measurement_id: String,
    patient_id: String,
    date: String,
    weight_kg: f64,
    neck_in: Option<f64>,
    chest_in: Option<f64>,
    waist_in: Option<f64>,
    hips_in: Option<f64>,
    created_at: String,
}

impl MeasurementRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            measurement_id: row.get(0)?,
            patient_id: row.get(1)?,
            date: row.get(2)?,
            weight_kg: row.get(3)?,
            neck_in: row.get(4)?,
            chest_in: row.get(5)?,
            waist_in: row.get(6)?,
            hips_in: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

impl TryFrom<MeasurementRow> for Measurement {
    type Error = DbError;

    fn try_from(row: MeasurementRow) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
            .map_err(|_| DbError::Constraint(format!("Invalid measurement date: {}", row.date)))?;

        Ok(Measurement {
            measurement_id: row.measurement_id,
            patient_id: row.patient_id,
            date,
            weight_kg: row.weight_kg,
            neck_in: row.neck_in,
            chest_in: row.chest_in,
            waist_in: row.waist_in,
            hips_in: row.hips_in,
            created_at: row.created_at,
        })
    }
}
