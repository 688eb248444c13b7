// src/processing/features/activity.rs
//! Workout and exercise-set aggregation around a meal anchor
//!
//! Two half-open windows per meal: lookback `[anchor - pre, anchor)` and
//! lookahead `[anchor, anchor + post)`. A record landing exactly on the
//! anchor belongs to the lookahead window, never both.

use crate::config::MealWindowConfig;
use crate::model::series::minutes_duration;
use crate::model::{ExerciseSet, Workout};
use chrono::{DateTime, Utc};

/// Aggregated activity around one meal. Empty windows aggregate to 0, not
/// unknown; a quiet afternoon is real data.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActivityFeatures {
    pub workout_count_pre: f64,
    pub workout_minutes_pre: f64,
    pub workout_energy_kcal_pre: f64,
    pub workout_count_post: f64,
    pub workout_minutes_post: f64,
    pub workout_energy_kcal_post: f64,
    pub exercise_set_count_pre: f64,
    pub exercise_set_volume_pre: f64,
    pub exercise_set_count_post: f64,
    pub exercise_set_volume_post: f64,
}

/// Aggregates activity records into pre/post meal windows.
pub struct ActivityAggregator {
    config: MealWindowConfig,
}

impl ActivityAggregator {
    /// Build an aggregator for the given window configuration.
    pub fn new(config: &MealWindowConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Aggregate workouts (keyed on start time) and exercise sets (keyed on
    /// performance time) around `anchor`. Missing numeric fields count as 0.
    pub fn aggregate(
        &self,
        anchor: DateTime<Utc>,
        workouts: &[Workout],
        exercise_sets: &[ExerciseSet],
    ) -> ActivityFeatures {
        let pre_start = anchor - minutes_duration(self.config.activity_pre_minutes as f64);
        let post_end = anchor + minutes_duration(self.config.activity_post_minutes as f64);

        let mut features = ActivityFeatures::default();

        for w in workouts {
            if w.start_at >= pre_start && w.start_at < anchor {
                features.workout_count_pre += 1.0;
                features.workout_minutes_pre += w.duration_min.unwrap_or(0.0);
                features.workout_energy_kcal_pre += w.active_energy_kcal.unwrap_or(0.0);
            } else if w.start_at >= anchor && w.start_at < post_end {
                features.workout_count_post += 1.0;
                features.workout_minutes_post += w.duration_min.unwrap_or(0.0);
                features.workout_energy_kcal_post += w.active_energy_kcal.unwrap_or(0.0);
            }
        }

        for s in exercise_sets {
            let volume = f64::from(s.reps.unwrap_or(0)) * s.weight_kg.unwrap_or(0.0);
            if s.performed_at >= pre_start && s.performed_at < anchor {
                features.exercise_set_count_pre += 1.0;
                features.exercise_set_volume_pre += volume;
            } else if s.performed_at >= anchor && s.performed_at < post_end {
                features.exercise_set_count_post += 1.0;
                features.exercise_set_volume_post += volume;
            }
        }

        features
    }
}
