//! Nutrition-facts lookup for meal planning.
//!
//! Free-text queries ("1 large apple", "100g chicken breast") are sent to a
//! CalorieNinjas-compatible endpoint and decoded into [`FoodMatch`] rows with
//! whole-number nutrition quantities.

pub mod client;
pub mod response;

pub use client::*;
pub use response::*;
