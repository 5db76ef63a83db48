//! Content fingerprints for meal plans.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::PlanResult;
use crate::models::{MealPlan, NewMealPlan};

/// Compute SHA-256 hash of data, hex encoded.
pub fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[derive(Serialize)]
struct PlanContent<'a> {
    patient_id: &'a str,
    chart: &'a MealPlan,
    notes: &'a str,
}

/// Fingerprint of a plan's content. Two saves of the same chart and notes
/// for the same patient share a fingerprint.
///
/// Totals are derived from the chart, so they are not hashed.
pub fn plan_fingerprint(plan: &NewMealPlan) -> PlanResult<String> {
    let content = PlanContent {
        patient_id: &plan.patient_id,
        chart: &plan.chart,
        notes: &plan.notes,
    };
    let canonical = serde_json::to_vec(&content)?;
    Ok(hash_data(&canonical))
}
