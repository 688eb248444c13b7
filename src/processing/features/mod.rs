// src/processing/features/mod.rs
//! Meal feature extraction
//!
//! Combines the per-concern extractors into one fixed `FeatureRow` shared
//! by dataset assembly and single-meal inference, so both paths produce the
//! identical feature set in the identical order.

pub mod activity;
pub mod context;
pub mod macros;
pub mod temporal;

pub use activity::{ActivityAggregator, ActivityFeatures};
pub use context::{baseline_median, ContextFeatureExtractor, ContextFeatures};
pub use macros::sum_meal_macros;
pub use temporal::{temporal_features, TemporalFeatures};

use crate::config::MealWindowConfig;
use crate::model::{ExerciseSet, MealEvent, MealMacros, RelativeTimeSeries, Value, Workout};

/// Feature column names, in the order `FeatureRow::feature_values` emits
/// them. The `pre6h`/`post3h` suffixes are column identities carried over
/// from the produced-artifact contract, not labels derived from the
/// configured window lengths.
pub const FEATURE_COLUMNS: &[&str] = &[
    "meal_hour",
    "meal_dow",
    "meal_is_weekend",
    "meal_grams",
    "meal_calories_kcal",
    "meal_carbs_g",
    "meal_fiber_g",
    "meal_protein_g",
    "meal_fat_g",
    "baseline_mgdl",
    "pre_slope_mgdl_per_min",
    "pre_mean_mgdl",
    "pre_std_mgdl",
    "workout_count_pre6h",
    "workout_minutes_pre6h",
    "workout_energy_kcal_pre6h",
    "workout_count_post3h",
    "workout_minutes_post3h",
    "workout_energy_kcal_post3h",
    "exercise_set_count_pre6h",
    "exercise_set_volume_pre6h",
    "exercise_set_count_post3h",
    "exercise_set_volume_post3h",
    "minutes_since_prev_meal",
];

/// The complete feature set for one meal.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub temporal: TemporalFeatures,
    pub macros: MealMacros,
    pub context: ContextFeatures,
    pub activity: ActivityFeatures,
    /// Gap to the previous meal in the cohort; unknown for the first meal.
    pub minutes_since_prev_meal: Value,
}

impl FeatureRow {
    /// Feature values in [`FEATURE_COLUMNS`] order.
    pub fn feature_values(&self) -> Vec<Value> {
        let t = &self.temporal;
        let m = &self.macros;
        let c = &self.context;
        let a = &self.activity;
        vec![
            Value::known(t.meal_hour),
            Value::known(t.meal_dow),
            Value::known(t.meal_is_weekend),
            m.grams,
            m.calories_kcal,
            m.carbs_g,
            m.fiber_g,
            m.protein_g,
            m.fat_g,
            c.baseline_mgdl,
            c.pre_slope_mgdl_per_min,
            c.pre_mean_mgdl,
            c.pre_std_mgdl,
            Value::known(a.workout_count_pre),
            Value::known(a.workout_minutes_pre),
            Value::known(a.workout_energy_kcal_pre),
            Value::known(a.workout_count_post),
            Value::known(a.workout_minutes_post),
            Value::known(a.workout_energy_kcal_post),
            Value::known(a.exercise_set_count_pre),
            Value::known(a.exercise_set_volume_pre),
            Value::known(a.exercise_set_count_post),
            Value::known(a.exercise_set_volume_post),
            self.minutes_since_prev_meal,
        ]
    }

    /// Named feature values in [`FEATURE_COLUMNS`] order.
    pub fn named_values(&self) -> Vec<(&'static str, Value)> {
        FEATURE_COLUMNS
            .iter()
            .copied()
            .zip(self.feature_values())
            .collect()
    }
}

/// Coordinates the per-concern extractors into a `FeatureRow`.
pub struct FeatureExtractor {
    context: ContextFeatureExtractor,
    activity: ActivityAggregator,
}

impl FeatureExtractor {
    /// Build the coordinated extractor for one run configuration.
    pub fn new(config: &MealWindowConfig) -> Self {
        Self {
            context: ContextFeatureExtractor::new(config),
            activity: ActivityAggregator::new(config),
        }
    }

    /// Extract the full feature set for one meal.
    ///
    /// `glucose` must already be sliced to the meal's combined window;
    /// workouts and sets are filtered here against the activity windows.
    pub fn extract(
        &self,
        meal: &MealEvent,
        minutes_since_prev_meal: Value,
        glucose: &RelativeTimeSeries,
        workouts: &[Workout],
        exercise_sets: &[ExerciseSet],
    ) -> FeatureRow {
        FeatureRow {
            temporal: temporal_features(meal.eaten_at),
            macros: meal.macros,
            context: self.context.extract(glucose),
            activity: self.activity.aggregate(meal.eaten_at, workouts, exercise_sets),
            minutes_since_prev_meal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_values_align_with_columns() {
        let config = MealWindowConfig::default();
        let meal = MealEvent {
            id: 1,
            eaten_at: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            macros: MealMacros::unknown(),
        };
        let row = FeatureExtractor::new(&config).extract(
            &meal,
            Value::UNKNOWN,
            &RelativeTimeSeries::default(),
            &[],
            &[],
        );

        let values = row.feature_values();
        assert_eq!(values.len(), FEATURE_COLUMNS.len());

        let named = row.named_values();
        assert_eq!(named[0], ("meal_hour", Value::known(8.0)));
        assert_eq!(named[2], ("meal_is_weekend", Value::known(0.0)));
        assert!(named
            .iter()
            .find(|(name, _)| *name == "baseline_mgdl")
            .unwrap()
            .1
            .is_unknown());
        assert_eq!(
            named.last().unwrap(),
            &("minutes_since_prev_meal", Value::UNKNOWN)
        );
    }

    #[test]
    fn test_no_activity_is_zero_valued() {
        let config = MealWindowConfig::default();
        let meal = MealEvent {
            id: 7,
            eaten_at: chrono::Utc.with_ymd_and_hms(2024, 3, 2, 13, 0, 0).unwrap(),
            macros: MealMacros::unknown(),
        };
        let row = FeatureExtractor::new(&config).extract(
            &meal,
            Value::known(240.0),
            &RelativeTimeSeries::default(),
            &[],
            &[],
        );
        assert_eq!(row.activity.workout_count_pre, 0.0);
        assert_eq!(row.minutes_since_prev_meal.get(), Some(240.0));
    }
}
