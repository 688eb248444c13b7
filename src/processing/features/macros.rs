// src/processing/features/macros.rs
//! Macro totals from the food-composition join

use crate::model::{FoodPortion, MealMacros, Value};

/// Sum meal macro totals from its line items.
///
/// Composition values are stored per serving; each item contributes
/// `grams / serving_grams` servings. Items with a non-positive grams or
/// serving size are skipped entirely.
pub fn sum_meal_macros(items: &[FoodPortion]) -> MealMacros {
    let mut grams = 0.0;
    let mut calories_kcal = 0.0;
    let mut carbs_g = 0.0;
    let mut fiber_g = 0.0;
    let mut protein_g = 0.0;
    let mut fat_g = 0.0;

    for item in items {
        if item.grams <= 0.0 || item.serving_grams <= 0.0 {
            continue;
        }
        let mult = item.grams / item.serving_grams;
        grams += item.grams;
        calories_kcal += item.calories_kcal * mult;
        carbs_g += item.carbs_g * mult;
        fiber_g += item.fiber_g * mult;
        protein_g += item.protein_g * mult;
        fat_g += item.fat_g * mult;
    }

    MealMacros {
        grams: Value::known(grams),
        calories_kcal: Value::known(calories_kcal),
        carbs_g: Value::known(carbs_g),
        fiber_g: Value::known(fiber_g),
        protein_g: Value::known(protein_g),
        fat_g: Value::known(fat_g),
    }
}
