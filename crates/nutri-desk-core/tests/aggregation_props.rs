//! Property tests for nutrition aggregation.

use nutri_desk_core::metrics::compute_bmi;
use nutri_desk_core::models::{FoodItem, Meal, MealPlan, NutritionTotals};
use nutri_desk_core::plan::{grand_totals, totals, MealPlanBuilder};
use proptest::prelude::*;

fn food_item() -> impl Strategy<Value = FoodItem> {
    ("[a-z]{1,12}", 0..5000u32, 0..500u32, 0..500u32, 0..500u32)
        .prop_map(|(label, c, p, cb, f)| FoodItem::new(label, c, p, cb, f))
}

fn items() -> impl Strategy<Value = Vec<FoodItem>> {
    proptest::collection::vec(food_item(), 0..20)
}

fn naive_sum(items: &[FoodItem]) -> NutritionTotals {
    let mut sum = NutritionTotals::default();
    for item in items {
        sum.calories += u64::from(item.calories);
        sum.protein += u64::from(item.protein);
        sum.carbs += u64::from(item.carbs);
        sum.fat += u64::from(item.fat);
    }
    sum
}

proptest! {
    /// Totals equal the field-wise sum
    #[test]
    fn totals_are_field_sums(list in items()) {
        prop_assert_eq!(totals(&list), naive_sum(&list));
    }

    /// Order of items does not change totals
    #[test]
    fn totals_ignore_order(list in items(), shift in 0..20usize) {
        let expected = totals(&list);

        let mut reversed = list.clone();
        reversed.reverse();
        prop_assert_eq!(totals(&reversed), expected);

        let mut rotated = list.clone();
        if !rotated.is_empty() {
            let k = shift % rotated.len();
            rotated.rotate_left(k);
        }
        prop_assert_eq!(totals(&rotated), expected);
    }

    /// Grand totals equal totals over all meals concatenated, in any meal order
    #[test]
    fn grand_totals_match_concatenation(
        breakfast in items(),
        lunch in items(),
        snacks in items(),
        dinner in items(),
    ) {
        let plan = MealPlan {
            breakfast: breakfast.clone(),
            lunch: lunch.clone(),
            snacks: snacks.clone(),
            dinner: dinner.clone(),
        };

        let forward: Vec<FoodItem> = [&breakfast, &lunch, &snacks, &dinner]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        let backward: Vec<FoodItem> = [&dinner, &snacks, &lunch, &breakfast]
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        prop_assert_eq!(grand_totals(&plan), totals(&forward));
        prop_assert_eq!(grand_totals(&plan), totals(&backward));

        let meal_sum: NutritionTotals = Meal::ALL.iter().map(|m| totals(plan.items(*m))).sum();
        prop_assert_eq!(grand_totals(&plan), meal_sum);
    }

    /// Removing an item subtracts exactly that item
    #[test]
    fn remove_subtracts_item(list in proptest::collection::vec(food_item(), 1..20), pick in 0..20usize) {
        let mut builder = MealPlanBuilder::new();
        for item in &list {
            builder.add_food(Meal::Dinner, item.clone());
        }

        let index = pick % list.len();
        let before = builder.grand_totals();
        let removed = builder.remove_food(Meal::Dinner, index).unwrap();
        let after = builder.grand_totals();

        prop_assert_eq!(&removed, &list[index]);
        prop_assert_eq!(after + NutritionTotals::of(&removed), before);
    }

    /// BMI is zero for non-positive heights
    #[test]
    fn bmi_zero_without_height(weight in 0.0..500.0f64, height in -300.0..=0.0f64) {
        prop_assert_eq!(compute_bmi(weight, height), 0.0);
    }

    /// BMI is positive for positive inputs
    #[test]
    fn bmi_positive(weight in 1.0..500.0f64, height in 50.0..250.0f64) {
        prop_assert!(compute_bmi(weight, height) > 0.0);
    }
}

#[test]
fn test_two_meal_totals() {
    let mut builder = MealPlanBuilder::new();
    builder.add_food(Meal::Breakfast, FoodItem::new("Oats", 200, 10, 20, 5));
    builder.add_food(Meal::Lunch, FoodItem::new("Rice bowl", 300, 20, 30, 10));

    assert_eq!(
        builder.grand_totals(),
        NutritionTotals {
            calories: 500,
            protein: 30,
            carbs: 50,
            fat: 15,
        }
    );
}
