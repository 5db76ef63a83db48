//! SQLite schema definition.

/// Complete database schema for nutri-desk.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    patient_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    age INTEGER NOT NULL,
    gender TEXT NOT NULL,                        -- 'Male' | 'Female'
    initial_weight_kg REAL NOT NULL,
    height_cm REAL NOT NULL,
    neck_in REAL NOT NULL,
    chest_in REAL,
    waist_in REAL NOT NULL,
    hips_in REAL,
    conditions TEXT NOT NULL DEFAULT '',
    allergies TEXT NOT NULL DEFAULT '',
    bmi REAL NOT NULL,                           -- frozen at intake
    bfp REAL NOT NULL,                           -- frozen at intake
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_created_at ON patients(created_at);

-- ============================================================================
-- Measurements (append-only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS measurements (
    measurement_id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(patient_id) ON DELETE CASCADE,
    date TEXT NOT NULL,                          -- YYYY-MM-DD
    weight_kg REAL NOT NULL,
    neck_in REAL,
    chest_in REAL,
    waist_in REAL,
    hips_in REAL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_measurements_patient_date ON measurements(patient_id, date);

-- ============================================================================
-- Meal Plans (append-only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS meal_plans (
    plan_id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(patient_id) ON DELETE CASCADE,
    chart TEXT NOT NULL,                         -- JSON {breakfast, lunch, snacks, dinner}
    totals TEXT NOT NULL,                        -- JSON {calories, protein, carbs, fat}
    notes TEXT NOT NULL DEFAULT '',
    content_hash TEXT NOT NULL,                  -- SHA-256 of (patient_id, chart, notes)
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_meal_plans_patient ON meal_plans(patient_id, created_at);
CREATE INDEX IF NOT EXISTS idx_meal_plans_hash ON meal_plans(patient_id, content_hash);

-- ============================================================================
-- Settings (key/value JSON)
-- ============================================================================

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- JSON object
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
