//! Food search over an external nutrition lookup.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use nutri_desk_lookup::{LookupResult, NutritionLookup};
use tracing::{info, warn};

use crate::models::FoodItem;

/// Message shown when a lookup succeeds with nothing to add.
pub const NO_RESULTS_MESSAGE: &str = "No results found. Try a different query or add manually.";

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum FoodSearch {
    Found(Vec<FoodItem>),
    NoResults,
}

impl FoodSearch {
    pub fn items(&self) -> &[FoodItem] {
        match self {
            FoodSearch::Found(items) => items,
            FoodSearch::NoResults => &[],
        }
    }
}

/// Look up `query` and convert matches to food items.
///
/// An empty match list is `NoResults`, which is distinct from a failed lookup.
pub async fn search_foods(lookup: &dyn NutritionLookup, query: &str) -> LookupResult<FoodSearch> {
    match lookup.lookup(query).await {
        Ok(matches) if matches.is_empty() => {
            info!(query, "No nutrition matches");
            Ok(FoodSearch::NoResults)
        }
        Ok(matches) => Ok(FoodSearch::Found(
            matches.into_iter().map(FoodItem::from).collect(),
        )),
        Err(e) => {
            warn!(query, error = %e, "Nutrition lookup failed");
            Err(e)
        }
    }
}

/// Queries currently being looked up.
///
/// A second lookup of the same query while the first is still running is
/// refused instead of being issued twice.
#[derive(Debug, Clone, Default)]
pub struct InFlightQueries {
    active: Arc<Mutex<HashSet<String>>>,
}

impl InFlightQueries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `query`. Returns `None` if it is already in flight. The claim
    /// is released when the guard drops.
    pub fn try_claim(&self, query: &str) -> Option<QueryGuard> {
        let key = query.trim().to_lowercase();
        let mut active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        if !active.insert(key.clone()) {
            return None;
        }
        Some(QueryGuard {
            key,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_active(&self, query: &str) -> bool {
        let active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        active.contains(&query.trim().to_lowercase())
    }
}

/// Releases an in-flight query on drop.
#[derive(Debug)]
pub struct QueryGuard {
    key: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl Drop for QueryGuard {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        active.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutri_desk_lookup::{LookupError, NutritionFacts, StaticLookup};

    fn lookup() -> StaticLookup {
        StaticLookup::new().with_food(
            "chicken breast",
            NutritionFacts {
                name: "chicken breast".into(),
                serving_size_g: 100.0,
                calories: 165.4,
                protein_g: 31.0,
                carbohydrates_total_g: 0.0,
                fat_total_g: 3.6,
            },
        )
    }

    #[tokio::test]
    async fn test_found() {
        let result = search_foods(&lookup(), "Chicken Breast").await.unwrap();
        assert_eq!(
            result,
            FoodSearch::Found(vec![FoodItem::new("100g chicken breast", 165, 31, 0, 4)])
        );
    }

    #[tokio::test]
    async fn test_no_results_is_not_an_error() {
        let result = search_foods(&lookup(), "unobtainium").await.unwrap();
        assert_eq!(result, FoodSearch::NoResults);
        assert!(result.items().is_empty());
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let result = search_foods(&StaticLookup::unavailable(), "apple").await;
        assert!(matches!(result, Err(LookupError::Http(_))));
    }

    #[test]
    fn test_in_flight_claim() {
        let queries = InFlightQueries::new();
        let guard = queries.try_claim("Apple").unwrap();
        assert!(queries.try_claim(" apple ").is_none());
        assert!(queries.is_active("APPLE"));

        drop(guard);
        assert!(!queries.is_active("apple"));
        assert!(queries.try_claim("apple").is_some());
    }
}
