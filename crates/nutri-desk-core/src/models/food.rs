//! Food line items and nutrition totals.

use std::iter::Sum;
use std::ops::Add;

use nutri_desk_lookup::FoodMatch;
use serde::{Deserialize, Serialize};

/// One food line in a meal plan.
///
/// Quantities are whole numbers: both lookup results and manual entries are
/// rounded when the item is created. Items have no identity beyond their
/// position in a meal, and duplicates are allowed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FoodItem {
    /// Display label, e.g. "100g chicken breast"
    pub label: String,
    /// Energy in kcal
    pub calories: u32,
    /// Protein in grams
    pub protein: u32,
    /// Carbohydrate in grams
    pub carbs: u32,
    /// Fat in grams
    pub fat: u32,
}

impl FoodItem {
    pub fn new(label: impl Into<String>, calories: u32, protein: u32, carbs: u32, fat: u32) -> Self {
        Self {
            label: label.into(),
            calories,
            protein,
            carbs,
            fat,
        }
    }
}

impl From<FoodMatch> for FoodItem {
    fn from(food: FoodMatch) -> Self {
        Self {
            label: food.label,
            calories: food.calories,
            protein: food.protein,
            carbs: food.carbs,
            fat: food.fat,
        }
    }
}

/// Summed nutrition over a set of food items.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutritionTotals {
    pub calories: u64,
    pub protein: u64,
    pub carbs: u64,
    pub fat: u64,
}

impl NutritionTotals {
    /// Totals for a single item.
    pub fn of(item: &FoodItem) -> Self {
        Self {
            calories: u64::from(item.calories),
            protein: u64::from(item.protein),
            carbs: u64::from(item.carbs),
            fat: u64::from(item.fat),
        }
    }
}

impl Add for NutritionTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl Sum for NutritionTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}
