//! Patient record store.
//!
//! [`RecordStore`] is the repository the UI talks to. [`LocalStore`] backs it
//! with SQLite and pushes fresh snapshots to subscribers after every write.

mod feed;

pub use feed::*;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::{Database, DbError};
use crate::metrics::{bfp_domain_ok, current_metrics, CurrentMetrics, WeightSeries};
use crate::models::{
    LetterheadSettings, Measurement, NewMealPlan, NewMeasurement, NewPatient, Patient,
    SavedMealPlan,
};
use crate::plan::{grand_totals, plan_fingerprint, PlanError};
use crate::validation::ValidationError;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Meal plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of saving a meal plan.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub plan: SavedMealPlan,
    /// The same content was saved moments ago; `plan` is that record
    pub deduplicated: bool,
}

/// Repeat saves of identical content within this window return the earlier
/// record instead of appending.
pub const DUPLICATE_SAVE_WINDOW: Duration = Duration::from_secs(5);

pub type PatientListener = Box<dyn Fn(Option<&Patient>) + Send + Sync>;
pub type PatientListListener = Box<dyn Fn(&[Patient]) + Send + Sync>;
pub type MeasurementsListener = Box<dyn Fn(&[Measurement]) + Send + Sync>;
pub type MealPlansListener = Box<dyn Fn(&[SavedMealPlan]) + Send + Sync>;

/// Repository for patients, measurements, meal plans and settings.
///
/// `watch_*` methods deliver the current state immediately and again after
/// every write that touches it, until the returned [`Subscription`] is
/// cancelled or dropped.
pub trait RecordStore: Send + Sync {
    fn create_patient(&self, patient: NewPatient) -> StoreResult<Patient>;
    fn get_patient(&self, patient_id: &str) -> StoreResult<Option<Patient>>;
    fn list_patients(&self) -> StoreResult<Vec<Patient>>;
    /// Returns `false` if the patient was already gone.
    fn delete_patient(&self, patient_id: &str) -> StoreResult<bool>;

    fn add_measurement(&self, patient_id: &str, entry: NewMeasurement) -> StoreResult<Measurement>;
    fn list_measurements(&self, patient_id: &str) -> StoreResult<Vec<Measurement>>;

    fn save_meal_plan(&self, plan: NewMealPlan) -> StoreResult<SaveOutcome>;
    fn list_meal_plans(&self, patient_id: &str) -> StoreResult<Vec<SavedMealPlan>>;

    fn get_letterhead(&self) -> StoreResult<LetterheadSettings>;
    fn save_letterhead(&self, update: LetterheadSettings) -> StoreResult<LetterheadSettings>;

    fn watch_patient(&self, patient_id: &str, listener: PatientListener) -> StoreResult<Subscription>;
    fn watch_patients(&self, listener: PatientListListener) -> StoreResult<Subscription>;
    fn watch_measurements(
        &self,
        patient_id: &str,
        listener: MeasurementsListener,
    ) -> StoreResult<Subscription>;
    fn watch_meal_plans(
        &self,
        patient_id: &str,
        listener: MealPlansListener,
    ) -> StoreResult<Subscription>;
}

/// SQLite-backed store. Clones share the same database and change feed.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
    feed: ChangeFeed,
    duplicate_window: Duration,
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            feed: ChangeFeed::new(),
            duplicate_window: DUPLICATE_SAVE_WINDOW,
        }
    }

    /// Set how long an identical meal plan save is treated as a repeat.
    /// `Duration::ZERO` appends every save.
    pub fn with_duplicate_window(mut self, window: Duration) -> Self {
        self.duplicate_window = window;
        self
    }

    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Metrics from the newest measurement, or intake values if none.
    pub fn current_metrics(&self, patient_id: &str) -> StoreResult<CurrentMetrics> {
        let db = self.lock()?;
        let patient = db
            .get_patient(patient_id)?
            .ok_or_else(|| StoreError::PatientNotFound(patient_id.to_string()))?;
        let latest = db.latest_measurement(patient_id)?;
        Ok(current_metrics(&patient, latest.as_ref()))
    }

    /// A saved plan by ID.
    pub fn get_meal_plan(&self, plan_id: &str) -> StoreResult<Option<SavedMealPlan>> {
        Ok(self.lock()?.get_meal_plan(plan_id)?)
    }

    /// Weight history for charting.
    pub fn weight_series(&self, patient_id: &str) -> StoreResult<WeightSeries> {
        let measurements = self.list_measurements(patient_id)?;
        Ok(WeightSeries::from_measurements(&measurements))
    }

    /// Load the current state of a topic.
    fn snapshot(db: &Database, topic: &Topic) -> StoreResult<Snapshot> {
        Ok(match topic {
            Topic::Patient(id) => Snapshot::Patient(db.get_patient(id)?),
            Topic::PatientList => Snapshot::Patients(db.list_patients()?),
            Topic::Measurements(id) => Snapshot::Measurements(db.list_measurements(id)?),
            Topic::MealPlans(id) => Snapshot::MealPlans(db.list_meal_plans(id)?),
        })
    }

    /// Stamp a write and load snapshots for the watched topics among
    /// `topics`. Must be called with the database lock held.
    fn snapshots(&self, db: &Database, topics: Vec<Topic>) -> StoreResult<Update> {
        let version = self.feed.next_version();
        let mut snapshots = Vec::new();
        for topic in topics {
            if self.feed.has_listeners(&topic) {
                let snapshot = Self::snapshot(db, &topic)?;
                snapshots.push((topic, snapshot));
            }
        }
        Ok(Update { version, snapshots })
    }

    /// Deliver snapshots. Must be called with no lock held.
    fn publish(&self, update: Update) {
        for (topic, snapshot) in update.snapshots {
            self.feed.publish(&topic, update.version, snapshot);
        }
    }

    /// Register a listener and deliver the current snapshot to it.
    fn watch(&self, topic: Topic, listener: SnapshotListener) -> StoreResult<Subscription> {
        let (subscription, version, initial) = {
            let db = self.lock()?;
            let version = self.feed.current_version();
            let initial = Self::snapshot(&db, &topic)?;
            (self.feed.register(topic, listener, version), version, initial)
        };
        self.feed.deliver_initial(&subscription, version, initial);
        Ok(subscription)
    }

    /// The newest save of `content_hash` if it falls inside the duplicate window.
    fn recent_duplicate(
        &self,
        db: &Database,
        patient_id: &str,
        content_hash: &str,
    ) -> StoreResult<Option<SavedMealPlan>> {
        if self.duplicate_window.is_zero() {
            return Ok(None);
        }
        let Some(latest) = db.latest_meal_plan_with_hash(patient_id, content_hash)? else {
            return Ok(None);
        };
        let saved_at = match DateTime::parse_from_rfc3339(&latest.created_at) {
            Ok(t) => t.with_timezone(&Utc),
            Err(e) => {
                warn!(plan_id = %latest.plan_id, error = %e, "Unreadable meal plan timestamp");
                return Ok(None);
            }
        };
        let age = Utc::now().signed_duration_since(saved_at);
        match age.to_std() {
            Ok(age) if age <= self.duplicate_window => Ok(Some(latest)),
            // Negative age: clock went backwards, treat as recent
            Err(_) => Ok(Some(latest)),
            Ok(_) => Ok(None),
        }
    }

    fn require_patient(db: &Database, patient_id: &str) -> StoreResult<()> {
        match db.get_patient(patient_id)? {
            Some(_) => Ok(()),
            None => Err(StoreError::PatientNotFound(patient_id.to_string())),
        }
    }
}

/// Snapshots taken under the database lock, stamped with the write's version.
struct Update {
    version: u64,
    snapshots: Vec<(Topic, Snapshot)>,
}

impl RecordStore for LocalStore {
    fn create_patient(&self, patient: NewPatient) -> StoreResult<Patient> {
        if !bfp_domain_ok(
            patient.gender.as_str(),
            patient.neck_in,
            patient.waist_in,
            patient.hips_in.unwrap_or(0.0),
        ) {
            return Err(ValidationError::CircumferenceDomain(
                "circumferences outside the body-fat formula's domain",
            )
            .into());
        }

        let patient = Patient::new(patient);
        let update = {
            let db = self.lock()?;
            db.insert_patient(&patient)?;
            self.snapshots(
                &db,
                vec![Topic::Patient(patient.patient_id.clone()), Topic::PatientList],
            )?
        };
        info!(patient_id = %patient.patient_id, "Patient created");
        self.publish(update);
        Ok(patient)
    }

    fn get_patient(&self, patient_id: &str) -> StoreResult<Option<Patient>> {
        debug!(patient_id, "Loading patient");
        Ok(self.lock()?.get_patient(patient_id)?)
    }

    fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        Ok(self.lock()?.list_patients()?)
    }

    fn delete_patient(&self, patient_id: &str) -> StoreResult<bool> {
        let update = {
            let db = self.lock()?;
            if !db.delete_patient(patient_id)? {
                debug!(patient_id, "Patient already deleted");
                return Ok(false);
            }
            let id = patient_id.to_string();
            self.snapshots(
                &db,
                vec![
                    Topic::Patient(id.clone()),
                    Topic::Measurements(id.clone()),
                    Topic::MealPlans(id),
                    Topic::PatientList,
                ],
            )?
        };

        info!(patient_id, "Patient deleted");
        self.publish(update);
        Ok(true)
    }

    fn add_measurement(&self, patient_id: &str, entry: NewMeasurement) -> StoreResult<Measurement> {
        if !(entry.weight_kg.is_finite() && entry.weight_kg > 0.0) {
            return Err(ValidationError::OutOfRange {
                field: "weight",
                reason: "must be greater than zero".into(),
            }
            .into());
        }

        let measurement = Measurement::new(patient_id.to_string(), entry);
        let update = {
            let db = self.lock()?;
            Self::require_patient(&db, patient_id)?;
            db.insert_measurement(&measurement)?;
            self.snapshots(&db, vec![Topic::Measurements(patient_id.to_string())])?
        };
        info!(patient_id, date = %measurement.date_label(), "Measurement added");
        self.publish(update);
        Ok(measurement)
    }

    fn list_measurements(&self, patient_id: &str) -> StoreResult<Vec<Measurement>> {
        Ok(self.lock()?.list_measurements(patient_id)?)
    }

    fn save_meal_plan(&self, mut plan: NewMealPlan) -> StoreResult<SaveOutcome> {
        if plan.chart.is_empty() {
            return Err(PlanError::EmptyPlan.into());
        }
        plan.totals = grand_totals(&plan.chart);
        let content_hash = plan_fingerprint(&plan)?;
        let patient_id = plan.patient_id.clone();

        let (saved, update) = {
            let db = self.lock()?;
            Self::require_patient(&db, &patient_id)?;

            if let Some(existing) = self.recent_duplicate(&db, &patient_id, &content_hash)? {
                warn!(patient_id = %patient_id, plan_id = %existing.plan_id, "Duplicate meal plan save ignored");
                return Ok(SaveOutcome {
                    plan: existing,
                    deduplicated: true,
                });
            }

            let saved = SavedMealPlan::new(plan, content_hash);
            db.insert_meal_plan(&saved)?;
            let update = self.snapshots(&db, vec![Topic::MealPlans(patient_id.clone())])?;
            (saved, update)
        };

        info!(patient_id = %patient_id, plan_id = %saved.plan_id, "Meal plan saved");
        self.publish(update);
        Ok(SaveOutcome {
            plan: saved,
            deduplicated: false,
        })
    }

    fn list_meal_plans(&self, patient_id: &str) -> StoreResult<Vec<SavedMealPlan>> {
        Ok(self.lock()?.list_meal_plans(patient_id)?)
    }

    fn get_letterhead(&self) -> StoreResult<LetterheadSettings> {
        Ok(self.lock()?.get_letterhead()?)
    }

    fn save_letterhead(&self, update: LetterheadSettings) -> StoreResult<LetterheadSettings> {
        let saved = self.lock()?.save_letterhead(update)?;
        info!("Letterhead saved");
        Ok(saved)
    }

    fn watch_patient(&self, patient_id: &str, listener: PatientListener) -> StoreResult<Subscription> {
        self.watch(
            Topic::Patient(patient_id.to_string()),
            Arc::new(move |snapshot: &Snapshot| {
                if let Snapshot::Patient(patient) = snapshot {
                    listener(patient.as_ref());
                }
            }),
        )
    }

    fn watch_patients(&self, listener: PatientListListener) -> StoreResult<Subscription> {
        self.watch(
            Topic::PatientList,
            Arc::new(move |snapshot: &Snapshot| {
                if let Snapshot::Patients(patients) = snapshot {
                    listener(patients.as_slice());
                }
            }),
        )
    }

    fn watch_measurements(
        &self,
        patient_id: &str,
        listener: MeasurementsListener,
    ) -> StoreResult<Subscription> {
        self.watch(
            Topic::Measurements(patient_id.to_string()),
            Arc::new(move |snapshot: &Snapshot| {
                if let Snapshot::Measurements(measurements) = snapshot {
                    listener(measurements.as_slice());
                }
            }),
        )
    }

    fn watch_meal_plans(
        &self,
        patient_id: &str,
        listener: MealPlansListener,
    ) -> StoreResult<Subscription> {
        self.watch(
            Topic::MealPlans(patient_id.to_string()),
            Arc::new(move |snapshot: &Snapshot| {
                if let Snapshot::MealPlans(plans) = snapshot {
                    listener(plans.as_slice());
                }
            }),
        )
    }
}
