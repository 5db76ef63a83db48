//! Nutri-Desk Core Library
//!
//! Local-first patient records and meal planning for a nutrition coach.
//!
//! # Architecture
//!
//! ```text
//! Intake form ──validate──► Patient (BMI/BFP frozen at intake)
//!                               │
//!                 Measurements (append-only) ──► current metrics, weight series
//!                               │
//! Lookup / manual entry ──► FoodItem (rounded) ──► MealPlanBuilder
//!                                                     │
//!                                       ┌─────────────┴─────────────┐
//!                                       ▼                           ▼
//!                            save (fingerprinted,            ExportJob (HTML)
//!                            duplicate saves ignored)        → host PDF renderer
//!                                       │
//!                         ChangeFeed ──► subscribed views
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Patient, Measurement, MealPlan, etc.)
//! - [`metrics`]: BMI and body-fat estimates, progress tracking
//! - [`plan`]: Nutrition totals and the meal-plan builder
//! - [`validation`]: Form validation
//! - [`store`]: Record store with push subscriptions
//! - [`search`]: Food search over the nutrition lookup
//! - [`export`]: Printable diet chart, JSON and CSV export
//! - [`config`], [`logging`]: Environment configuration and tracing setup

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod plan;
pub mod search;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use db::Database;
pub use export::{DietChartDocument, ExportJob, ExportOptions, MealPlanExport};
pub use metrics::{BodyMetrics, CurrentMetrics, WeightSeries};
pub use models::{
    FoodItem, Gender, LetterheadSettings, Meal, MealPlan, Measurement, NewMealPlan,
    NewMeasurement, NewPatient, NutritionTotals, Patient, SavedMealPlan,
};
pub use plan::MealPlanBuilder;
pub use search::FoodSearch;
pub use store::{LocalStore, RecordStore, SaveOutcome, Subscription};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use nutri_desk_lookup::{CalorieNinjasClient, LookupError, NutritionLookup};
use tracing::info;

use crate::config::{AppConfig, ConfigError};
use crate::db::DbError;
use crate::export::ExportError;
use crate::plan::PlanError;
use crate::search::{InFlightQueries, NO_RESULTS_MESSAGE};
use crate::store::StoreError;
use crate::validation::{ManualFoodEntry, MeasurementEntry, PatientIntake, ValidationError};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum NutriDeskError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Busy: {0}")]
    Busy(String),
}

impl From<DbError> for NutriDeskError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => NutriDeskError::NotFound(what),
            DbError::Json(e) => NutriDeskError::Serialization(e.to_string()),
            other => NutriDeskError::Database(other.to_string()),
        }
    }
}

impl From<ValidationError> for NutriDeskError {
    fn from(e: ValidationError) -> Self {
        NutriDeskError::Validation(e.to_string())
    }
}

impl From<PlanError> for NutriDeskError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::EmptyPlan => NutriDeskError::Validation(e.to_string()),
            PlanError::NoSuchItem { .. } => NutriDeskError::NotFound(e.to_string()),
            PlanError::Serialization(e) => NutriDeskError::Serialization(e.to_string()),
        }
    }
}

impl From<StoreError> for NutriDeskError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Database(e) => e.into(),
            StoreError::Validation(e) => e.into(),
            StoreError::Plan(e) => e.into(),
            StoreError::PatientNotFound(id) => NutriDeskError::NotFound(format!("patient {id}")),
            StoreError::Poisoned => NutriDeskError::Database("Lock poisoned".into()),
        }
    }
}

impl From<ExportError> for NutriDeskError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::EmptyChart => NutriDeskError::Validation(e.to_string()),
            ExportError::Serialization(e) => NutriDeskError::Serialization(e.to_string()),
        }
    }
}

impl From<LookupError> for NutriDeskError {
    fn from(e: LookupError) -> Self {
        NutriDeskError::Lookup(e.to_string())
    }
}

impl From<ConfigError> for NutriDeskError {
    fn from(e: ConfigError) -> Self {
        NutriDeskError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for NutriDeskError {
    fn from(e: serde_json::Error) -> Self {
        NutriDeskError::Serialization(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for NutriDeskError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        NutriDeskError::Database(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path. Food search is disabled.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<NutriDeskCore>, NutriDeskError> {
    let store = LocalStore::open(&path)?;
    Ok(Arc::new(NutriDeskCore::new(store, None)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<NutriDeskCore>, NutriDeskError> {
    let store = LocalStore::open_in_memory()?;
    Ok(Arc::new(NutriDeskCore::new(store, None)))
}

/// Open the database and lookup client described by the environment.
///
/// Food search stays disabled when no API key is configured.
#[uniffi::export]
pub fn open_from_env() -> Result<Arc<NutriDeskCore>, NutriDeskError> {
    let config = AppConfig::from_env()?;
    let store = LocalStore::open(&config.db_path)?;

    let lookup: Option<Arc<dyn NutritionLookup>> = match config.lookup_config() {
        Ok(lookup_config) => Some(Arc::new(CalorieNinjasClient::new(lookup_config)?)),
        Err(ConfigError::Missing(_)) => None,
        Err(e) => return Err(e.into()),
    };

    info!(db_path = %config.db_path.display(), lookup = lookup.is_some(), "Opened nutri-desk");
    Ok(Arc::new(NutriDeskCore::new(store, lookup)))
}

/// Install the global tracing subscriber from `RUST_LOG` / `LOG_FORMAT`.
#[uniffi::export]
pub fn init_logging() -> Result<(), NutriDeskError> {
    logging::LoggingConfig::from_env()
        .init()
        .map_err(|e| NutriDeskError::Config(e.to_string()))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store and lookup wrapper for FFI.
#[derive(uniffi::Object)]
pub struct NutriDeskCore {
    store: LocalStore,
    lookup: Option<Arc<dyn NutritionLookup>>,
    in_flight: InFlightQueries,
}

impl NutriDeskCore {
    /// Wrap a store and an optional lookup source.
    pub fn new(store: LocalStore, lookup: Option<Arc<dyn NutritionLookup>>) -> Self {
        Self {
            store,
            lookup,
            in_flight: InFlightQueries::new(),
        }
    }

    /// The underlying store, shared with this object.
    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    fn patient_name(&self, patient_id: &str) -> Result<String, NutriDeskError> {
        self.store
            .get_patient(patient_id)?
            .map(|p| p.name)
            .ok_or_else(|| NutriDeskError::NotFound(format!("patient {patient_id}")))
    }

    fn export_job(
        &self,
        patient_name: String,
        chart: MealPlan,
        notes: String,
    ) -> Result<FfiExportJob, NutriDeskError> {
        let letterhead = self.store.get_letterhead()?;
        let document = DietChartDocument::new(patient_name, letterhead, chart, notes);
        Ok(ExportJob::for_document(&document)?.into())
    }

    fn saved_plan(&self, plan_id: &str) -> Result<SavedMealPlan, NutriDeskError> {
        self.store
            .get_meal_plan(plan_id)?
            .ok_or_else(|| NutriDeskError::NotFound(format!("meal plan {plan_id}")))
    }
}

#[uniffi::export]
impl NutriDeskCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Validate an intake form and create the patient.
    pub fn create_patient(&self, intake: FfiPatientIntake) -> Result<FfiPatient, NutriDeskError> {
        let new_patient = PatientIntake::from(intake).validate()?;
        let patient = self.store.create_patient(new_patient)?;
        Ok(patient.into())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, patient_id: String) -> Result<Option<FfiPatient>, NutriDeskError> {
        let patient = self.store.get_patient(&patient_id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// List all patients, newest first.
    pub fn list_patients(&self) -> Result<Vec<FfiPatient>, NutriDeskError> {
        let patients = self.store.list_patients()?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Delete a patient and everything recorded for them. Returns `false` if
    /// the patient was already gone.
    pub fn delete_patient(&self, patient_id: String) -> Result<bool, NutriDeskError> {
        Ok(self.store.delete_patient(&patient_id)?)
    }

    // =========================================================================
    // Measurement Operations
    // =========================================================================

    /// Validate a measurement form and append it.
    pub fn add_measurement(
        &self,
        patient_id: String,
        entry: FfiMeasurementEntry,
    ) -> Result<FfiMeasurement, NutriDeskError> {
        let new_measurement = MeasurementEntry::from(entry).validate()?;
        let measurement = self.store.add_measurement(&patient_id, new_measurement)?;
        Ok(measurement.into())
    }

    /// Measurements by date, oldest first.
    pub fn list_measurements(&self, patient_id: String) -> Result<Vec<FfiMeasurement>, NutriDeskError> {
        let measurements = self.store.list_measurements(&patient_id)?;
        Ok(measurements.into_iter().map(|m| m.into()).collect())
    }

    /// BMI and BFP from the newest measurement.
    pub fn current_metrics(&self, patient_id: String) -> Result<FfiCurrentMetrics, NutriDeskError> {
        Ok(self.store.current_metrics(&patient_id)?.into())
    }

    /// Weight history for the progress chart.
    pub fn weight_series(&self, patient_id: String) -> Result<FfiWeightSeries, NutriDeskError> {
        Ok(self.store.weight_series(&patient_id)?.into())
    }

    // =========================================================================
    // Meal Plan Draft Operations
    // =========================================================================

    /// Append a food item to a meal of the draft.
    pub fn draft_add_food(
        &self,
        draft: FfiMealPlanDraft,
        meal: FfiMeal,
        item: FfiFoodItem,
    ) -> FfiMealPlanDraft {
        let mut builder = MealPlanBuilder::from(draft);
        builder.add_food(meal.into(), item.into());
        FfiMealPlanDraft::from(&builder)
    }

    /// Validate a manual entry and append it to a meal of the draft.
    pub fn draft_add_manual_food(
        &self,
        draft: FfiMealPlanDraft,
        meal: FfiMeal,
        entry: FfiManualFoodEntry,
    ) -> Result<FfiMealPlanDraft, NutriDeskError> {
        let item = FoodItem::from_manual(&entry.into())?;
        let mut builder = MealPlanBuilder::from(draft);
        builder.add_food(meal.into(), item);
        Ok(FfiMealPlanDraft::from(&builder))
    }

    /// Remove the item at `index` from a meal of the draft.
    pub fn draft_remove_food(
        &self,
        draft: FfiMealPlanDraft,
        meal: FfiMeal,
        index: u32,
    ) -> Result<FfiMealPlanDraft, NutriDeskError> {
        let mut builder = MealPlanBuilder::from(draft);
        builder.remove_food(meal.into(), index as usize)?;
        Ok(FfiMealPlanDraft::from(&builder))
    }

    /// Per-meal subtotals and grand totals of the draft.
    pub fn draft_totals(&self, draft: FfiMealPlanDraft) -> FfiDraftTotals {
        let builder = MealPlanBuilder::from(draft);
        FfiDraftTotals {
            breakfast: builder.meal_totals(Meal::Breakfast).into(),
            lunch: builder.meal_totals(Meal::Lunch).into(),
            snacks: builder.meal_totals(Meal::Snacks).into(),
            dinner: builder.meal_totals(Meal::Dinner).into(),
            grand: builder.grand_totals().into(),
        }
    }

    /// Save the draft for a patient. Saving identical content again returns
    /// the earlier plan flagged as deduplicated.
    pub fn save_meal_plan(
        &self,
        patient_id: String,
        draft: FfiMealPlanDraft,
    ) -> Result<FfiSaveOutcome, NutriDeskError> {
        let plan = MealPlanBuilder::from(draft).finish(&patient_id)?;
        let outcome = self.store.save_meal_plan(plan)?;
        Ok(outcome.into())
    }

    /// A patient's saved plans, newest first.
    pub fn list_meal_plans(&self, patient_id: String) -> Result<Vec<FfiSavedMealPlan>, NutriDeskError> {
        let plans = self.store.list_meal_plans(&patient_id)?;
        Ok(plans.into_iter().map(|p| p.into()).collect())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    /// Stored letterhead; absent fields are `None`.
    pub fn get_letterhead(&self) -> Result<FfiLetterhead, NutriDeskError> {
        Ok(self.store.get_letterhead()?.into())
    }

    /// Merge the provided fields into the stored letterhead.
    pub fn save_letterhead(&self, letterhead: FfiLetterhead) -> Result<FfiLetterhead, NutriDeskError> {
        Ok(self.store.save_letterhead(letterhead.into())?.into())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Render the draft as a printable diet chart for the host PDF renderer.
    pub fn build_export_job(
        &self,
        patient_id: String,
        draft: FfiMealPlanDraft,
    ) -> Result<FfiExportJob, NutriDeskError> {
        let patient_name = self.patient_name(&patient_id)?;
        self.export_job(patient_name, draft.chart(), draft.notes)
    }

    /// Render a saved plan as a printable diet chart.
    pub fn build_saved_plan_export_job(&self, plan_id: String) -> Result<FfiExportJob, NutriDeskError> {
        let plan = self.saved_plan(&plan_id)?;
        let patient_name = self.patient_name(&plan.patient_id)?;
        self.export_job(patient_name, plan.chart, plan.notes)
    }

    /// Export a saved plan as JSON.
    pub fn export_meal_plan_json(&self, plan_id: String) -> Result<String, NutriDeskError> {
        let plan = self.saved_plan(&plan_id)?;
        let patient_name = self.patient_name(&plan.patient_id)?;
        Ok(MealPlanExport::from_plan(&plan, &patient_name).to_json()?)
    }

    /// Export a saved plan as CSV.
    pub fn export_meal_plan_csv(&self, plan_id: String) -> Result<String, NutriDeskError> {
        let plan = self.saved_plan(&plan_id)?;
        let patient_name = self.patient_name(&plan.patient_id)?;
        Ok(MealPlanExport::from_plan(&plan, &patient_name).to_csv())
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Observe one patient. `None` is delivered once the patient is deleted.
    pub fn watch_patient(
        &self,
        patient_id: String,
        observer: Arc<dyn PatientObserver>,
    ) -> Result<Arc<FfiSubscription>, NutriDeskError> {
        let subscription = self.store.watch_patient(
            &patient_id,
            Box::new(move |patient: Option<&Patient>| {
                observer.on_patient(patient.cloned().map(Into::into))
            }),
        )?;
        Ok(Arc::new(FfiSubscription::from(subscription)))
    }

    /// Observe the patient list.
    pub fn watch_patients(
        &self,
        observer: Arc<dyn PatientListObserver>,
    ) -> Result<Arc<FfiSubscription>, NutriDeskError> {
        let subscription = self.store.watch_patients(Box::new(move |patients: &[Patient]| {
            observer.on_patients(patients.iter().cloned().map(Into::into).collect())
        }))?;
        Ok(Arc::new(FfiSubscription::from(subscription)))
    }

    /// Observe a patient's measurements.
    pub fn watch_measurements(
        &self,
        patient_id: String,
        observer: Arc<dyn MeasurementsObserver>,
    ) -> Result<Arc<FfiSubscription>, NutriDeskError> {
        let subscription = self.store.watch_measurements(
            &patient_id,
            Box::new(move |measurements: &[Measurement]| {
                observer.on_measurements(measurements.iter().cloned().map(Into::into).collect())
            }),
        )?;
        Ok(Arc::new(FfiSubscription::from(subscription)))
    }

    /// Observe a patient's saved meal plans.
    pub fn watch_meal_plans(
        &self,
        patient_id: String,
        observer: Arc<dyn MealPlansObserver>,
    ) -> Result<Arc<FfiSubscription>, NutriDeskError> {
        let subscription = self.store.watch_meal_plans(
            &patient_id,
            Box::new(move |plans: &[SavedMealPlan]| {
                observer.on_meal_plans(plans.iter().cloned().map(Into::into).collect())
            }),
        )?;
        Ok(Arc::new(FfiSubscription::from(subscription)))
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl NutriDeskCore {
    /// Look up nutrition facts for a free-text query.
    ///
    /// A second search for the same query while one is running fails with
    /// `Busy`.
    pub async fn search_foods(&self, query: String) -> Result<FfiFoodSearch, NutriDeskError> {
        let lookup = self
            .lookup
            .clone()
            .ok_or_else(|| NutriDeskError::Config("nutrition lookup is not configured".into()))?;

        let _guard = self
            .in_flight
            .try_claim(&query)
            .ok_or_else(|| NutriDeskError::Busy(format!("already searching for {query:?}")))?;

        let result = search::search_foods(lookup.as_ref(), &query).await?;
        Ok(result.into())
    }
}

// =========================================================================
// Foreign Observers
// =========================================================================

#[uniffi::export(with_foreign)]
pub trait PatientObserver: Send + Sync {
    fn on_patient(&self, patient: Option<FfiPatient>);
}

#[uniffi::export(with_foreign)]
pub trait PatientListObserver: Send + Sync {
    fn on_patients(&self, patients: Vec<FfiPatient>);
}

#[uniffi::export(with_foreign)]
pub trait MeasurementsObserver: Send + Sync {
    fn on_measurements(&self, measurements: Vec<FfiMeasurement>);
}

#[uniffi::export(with_foreign)]
pub trait MealPlansObserver: Send + Sync {
    fn on_meal_plans(&self, plans: Vec<FfiSavedMealPlan>);
}

/// Handle returned by the `watch_*` methods. Cancel it when the view goes away.
#[derive(uniffi::Object)]
pub struct FfiSubscription {
    inner: Subscription,
}

impl From<Subscription> for FfiSubscription {
    fn from(inner: Subscription) -> Self {
        Self { inner }
    }
}

#[uniffi::export]
impl FfiSubscription {
    /// Stop receiving updates. Safe to call more than once.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe intake form, fields as typed.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientIntake {
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

impl From<FfiPatientIntake> for PatientIntake {
    fn from(form: FfiPatientIntake) -> Self {
        PatientIntake {
            name: form.name,
            age: form.age,
            gender: form.gender,
            weight_kg: form.weight_kg,
            height_cm: form.height_cm,
            neck_in: form.neck_in,
            chest_in: form.chest_in,
            waist_in: form.waist_in,
            hips_in: form.hips_in,
            conditions: form.conditions,
            allergies: form.allergies,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiPatient {
    pub patient_id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub initial_weight_kg: f64,
    pub height_cm: f64,
    pub neck_in: f64,
    pub chest_in: Option<f64>,
    pub waist_in: f64,
    pub hips_in: Option<f64>,
    pub conditions: String,
    pub allergies: String,
    pub bmi: f64,
    pub bfp: f64,
    pub created_at: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            patient_id: patient.patient_id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender.as_str().to_string(),
            initial_weight_kg: patient.initial_weight_kg,
            height_cm: patient.height_cm,
            neck_in: patient.neck_in,
            chest_in: patient.chest_in,
            waist_in: patient.waist_in,
            hips_in: patient.hips_in,
            conditions: patient.conditions,
            allergies: patient.allergies,
            bmi: patient.bmi,
            bfp: patient.bfp,
            created_at: patient.created_at,
        }
    }
}

/// FFI-safe measurement form, fields as typed.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiMeasurementEntry {
    /// `YYYY-MM-DD`
    pub date: String,
    pub weight_kg: String,
    pub neck_in: String,
    pub chest_in: String,
    pub waist_in: String,
    pub hips_in: String,
}

impl From<FfiMeasurementEntry> for MeasurementEntry {
    fn from(form: FfiMeasurementEntry) -> Self {
        MeasurementEntry {
            date: form.date,
            weight_kg: form.weight_kg,
            neck_in: form.neck_in,
            chest_in: form.chest_in,
            waist_in: form.waist_in,
            hips_in: form.hips_in,
        }
    }
}

/// FFI-safe measurement.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiMeasurement {
    pub measurement_id: String,
    pub patient_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub weight_kg: f64,
    pub neck_in: Option<f64>,
    pub chest_in: Option<f64>,
    pub waist_in: Option<f64>,
    pub hips_in: Option<f64>,
}

impl From<Measurement> for FfiMeasurement {
    fn from(m: Measurement) -> Self {
        Self {
            date: m.date_label(),
            measurement_id: m.measurement_id,
            patient_id: m.patient_id,
            weight_kg: m.weight_kg,
            neck_in: m.neck_in,
            chest_in: m.chest_in,
            waist_in: m.waist_in,
            hips_in: m.hips_in,
        }
    }
}

/// FFI-safe current metrics.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiCurrentMetrics {
    /// Date of the measurement used, `None` for intake values
    pub as_of: Option<String>,
    pub weight_kg: f64,
    pub bmi: f64,
    pub bfp: Option<f64>,
}

impl From<CurrentMetrics> for FfiCurrentMetrics {
    fn from(metrics: CurrentMetrics) -> Self {
        Self {
            as_of: metrics.as_of.map(|d| d.format("%Y-%m-%d").to_string()),
            weight_kg: metrics.weight_kg,
            bmi: metrics.bmi,
            bfp: metrics.bfp,
        }
    }
}

/// FFI-safe weight series.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiWeightSeries {
    pub labels: Vec<String>,
    pub weights: Vec<f64>,
    /// At least two points
    pub chartable: bool,
}

impl From<WeightSeries> for FfiWeightSeries {
    fn from(series: WeightSeries) -> Self {
        Self {
            chartable: series.is_chartable(),
            labels: series.labels,
            weights: series.weights,
        }
    }
}

/// FFI-safe meal category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiMeal {
    Breakfast,
    Lunch,
    Snacks,
    Dinner,
}

impl From<FfiMeal> for Meal {
    fn from(meal: FfiMeal) -> Self {
        match meal {
            FfiMeal::Breakfast => Meal::Breakfast,
            FfiMeal::Lunch => Meal::Lunch,
            FfiMeal::Snacks => Meal::Snacks,
            FfiMeal::Dinner => Meal::Dinner,
        }
    }
}

/// FFI-safe food item.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiFoodItem {
    pub label: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl From<FoodItem> for FfiFoodItem {
    fn from(item: FoodItem) -> Self {
        Self {
            label: item.label,
            calories: item.calories,
            protein: item.protein,
            carbs: item.carbs,
            fat: item.fat,
        }
    }
}

impl From<FfiFoodItem> for FoodItem {
    fn from(item: FfiFoodItem) -> Self {
        FoodItem::new(item.label, item.calories, item.protein, item.carbs, item.fat)
    }
}

/// FFI-safe manual food form, fields as typed.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiManualFoodEntry {
    pub label: String,
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
}

impl From<FfiManualFoodEntry> for ManualFoodEntry {
    fn from(form: FfiManualFoodEntry) -> Self {
        ManualFoodEntry {
            label: form.label,
            calories: form.calories,
            protein: form.protein,
            carbs: form.carbs,
            fat: form.fat,
        }
    }
}

/// FFI-safe nutrition totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Record)]
pub struct FfiNutritionTotals {
    pub calories: u64,
    pub protein: u64,
    pub carbs: u64,
    pub fat: u64,
}

impl From<NutritionTotals> for FfiNutritionTotals {
    fn from(totals: NutritionTotals) -> Self {
        Self {
            calories: totals.calories,
            protein: totals.protein,
            carbs: totals.carbs,
            fat: totals.fat,
        }
    }
}

/// FFI-safe unsaved meal plan held by the UI.
#[derive(Debug, Clone, Default, PartialEq, uniffi::Record)]
pub struct FfiMealPlanDraft {
    pub breakfast: Vec<FfiFoodItem>,
    pub lunch: Vec<FfiFoodItem>,
    pub snacks: Vec<FfiFoodItem>,
    pub dinner: Vec<FfiFoodItem>,
    pub notes: String,
}

impl FfiMealPlanDraft {
    fn chart(&self) -> MealPlan {
        let convert = |items: &[FfiFoodItem]| -> Vec<FoodItem> {
            items.iter().cloned().map(Into::into).collect()
        };
        MealPlan {
            breakfast: convert(&self.breakfast),
            lunch: convert(&self.lunch),
            snacks: convert(&self.snacks),
            dinner: convert(&self.dinner),
        }
    }
}

impl From<FfiMealPlanDraft> for MealPlanBuilder {
    fn from(draft: FfiMealPlanDraft) -> Self {
        MealPlanBuilder::from_parts(draft.chart(), draft.notes)
    }
}

impl From<&MealPlanBuilder> for FfiMealPlanDraft {
    fn from(builder: &MealPlanBuilder) -> Self {
        let convert = |items: &[FoodItem]| -> Vec<FfiFoodItem> {
            items.iter().cloned().map(Into::into).collect()
        };
        let chart = builder.chart();
        Self {
            breakfast: convert(&chart.breakfast),
            lunch: convert(&chart.lunch),
            snacks: convert(&chart.snacks),
            dinner: convert(&chart.dinner),
            notes: builder.notes().to_string(),
        }
    }
}

/// FFI-safe draft totals.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiDraftTotals {
    pub breakfast: FfiNutritionTotals,
    pub lunch: FfiNutritionTotals,
    pub snacks: FfiNutritionTotals,
    pub dinner: FfiNutritionTotals,
    pub grand: FfiNutritionTotals,
}

/// FFI-safe saved meal plan.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiSavedMealPlan {
    pub plan_id: String,
    pub patient_id: String,
    pub breakfast: Vec<FfiFoodItem>,
    pub lunch: Vec<FfiFoodItem>,
    pub snacks: Vec<FfiFoodItem>,
    pub dinner: Vec<FfiFoodItem>,
    pub totals: FfiNutritionTotals,
    pub notes: String,
    pub created_at: String,
}

impl From<SavedMealPlan> for FfiSavedMealPlan {
    fn from(plan: SavedMealPlan) -> Self {
        let convert =
            |items: Vec<FoodItem>| -> Vec<FfiFoodItem> { items.into_iter().map(Into::into).collect() };
        Self {
            plan_id: plan.plan_id,
            patient_id: plan.patient_id,
            breakfast: convert(plan.chart.breakfast),
            lunch: convert(plan.chart.lunch),
            snacks: convert(plan.chart.snacks),
            dinner: convert(plan.chart.dinner),
            totals: plan.totals.into(),
            notes: plan.notes,
            created_at: plan.created_at,
        }
    }
}

/// FFI-safe save result.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiSaveOutcome {
    pub plan: FfiSavedMealPlan,
    pub deduplicated: bool,
}

impl From<SaveOutcome> for FfiSaveOutcome {
    fn from(outcome: SaveOutcome) -> Self {
        Self {
            plan: outcome.plan.into(),
            deduplicated: outcome.deduplicated,
        }
    }
}

/// FFI-safe food search result.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiFoodSearch {
    Found { items: Vec<FfiFoodItem> },
    NoResults { message: String },
}

impl From<FoodSearch> for FfiFoodSearch {
    fn from(search: FoodSearch) -> Self {
        match search {
            FoodSearch::Found(items) => FfiFoodSearch::Found {
                items: items.into_iter().map(Into::into).collect(),
            },
            FoodSearch::NoResults => FfiFoodSearch::NoResults {
                message: NO_RESULTS_MESSAGE.to_string(),
            },
        }
    }
}

/// FFI-safe letterhead.
#[derive(Debug, Clone, Default, PartialEq, uniffi::Record)]
pub struct FfiLetterhead {
    pub nutritionist_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<LetterheadSettings> for FfiLetterhead {
    fn from(settings: LetterheadSettings) -> Self {
        Self {
            nutritionist_name: settings.nutritionist_name,
            email: settings.email,
            phone: settings.phone,
        }
    }
}

impl From<FfiLetterhead> for LetterheadSettings {
    fn from(letterhead: FfiLetterhead) -> Self {
        LetterheadSettings {
            nutritionist_name: letterhead.nutritionist_name,
            email: letterhead.email,
            phone: letterhead.phone,
        }
    }
}

/// FFI-safe PDF export job.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiExportJob {
    pub anchor_id: String,
    pub filename: String,
    pub html: String,
    pub margin: f64,
    pub image_quality: f64,
    pub scale: f64,
    pub unit: String,
    pub format: String,
    pub orientation: String,
}

impl From<ExportJob> for FfiExportJob {
    fn from(job: ExportJob) -> Self {
        Self {
            anchor_id: job.anchor_id,
            filename: job.filename,
            html: job.html,
            margin: job.options.margin,
            image_quality: job.options.image_quality,
            scale: job.options.scale,
            unit: job.options.unit,
            format: job.options.format,
            orientation: job.options.orientation,
        }
    }
}
