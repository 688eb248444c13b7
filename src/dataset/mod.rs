// src/dataset/mod.rs
//! Meal-centered dataset assembly
//!
//! One row per meal event, ordered by anchor time. Per-meal work is
//! independent over read-only inputs, so the loop fans out across a rayon
//! pool; prev-meal gaps are derived from the sorted anchor list before the
//! fan-out so no cross-meal state is shared.

pub mod table;

use crate::config::MealWindowConfig;
use crate::model::series::{minutes_between, minutes_duration};
use crate::model::{ExerciseSet, GlucoseSeries, MealEvent, Value, Workout};
use crate::processing::features::{FeatureExtractor, FeatureRow, FEATURE_COLUMNS};
use crate::processing::targets::{TargetExtractor, TargetRow, TARGET_COLUMNS};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info};

/// One assembled dataset row.
#[derive(Debug, Clone, PartialEq)]
pub struct MealRow {
    /// Identity of the source meal event.
    pub meal_event_id: u64,
    /// Meal anchor timestamp.
    pub eaten_at: DateTime<Utc>,
    /// The complete feature set.
    pub features: FeatureRow,
    /// Post-meal outcome targets.
    pub targets: TargetRow,
    /// Diagnostic: glucose points found in the combined meal window,
    /// including unknown-valued ones.
    pub egv_points_in_window: usize,
}

/// The assembled meal-centered dataset, rows ascending by anchor time.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<MealRow>,
}

impl Dataset {
    /// Build a dataset from pre-assembled rows.
    pub fn new(rows: Vec<MealRow>) -> Self {
        Self { rows }
    }

    /// All rows in ascending anchor order.
    pub fn rows(&self) -> &[MealRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Model-input columns: everything except identity, timestamp,
    /// diagnostic count, and target columns.
    pub fn feature_columns() -> &'static [&'static str] {
        FEATURE_COLUMNS
    }

    /// Target columns available for supervised training.
    pub fn target_columns() -> &'static [&'static str] {
        TARGET_COLUMNS
    }

    /// Rows whose non-baseline targets are all known; the training-ready
    /// subset after low-confidence filtering.
    pub fn labeled_rows(&self) -> impl Iterator<Item = &MealRow> {
        self.rows
            .iter()
            .filter(|r| r.targets.target_values().iter().all(Value::is_known))
    }

    /// Ascending-time holdout split. The earliest `1 - test_frac` of rows
    /// form the training set; at least one row stays in training.
    pub fn time_split(&self, test_frac: f64) -> (Dataset, Dataset) {
        let n = self.rows.len();
        let cut = (((1.0 - test_frac) * n as f64) as usize).max(1).min(n);
        (
            Dataset::new(self.rows[..cut].to_vec()),
            Dataset::new(self.rows[cut..].to_vec()),
        )
    }
}

/// Assembles the full cohort dataset.
pub struct DatasetAssembler {
    config: MealWindowConfig,
    features: FeatureExtractor,
    targets: TargetExtractor,
}

impl DatasetAssembler {
    /// Build an assembler for one run configuration.
    pub fn new(config: &MealWindowConfig) -> Self {
        Self {
            config: config.clone(),
            features: FeatureExtractor::new(config),
            targets: TargetExtractor::new(config),
        }
    }

    /// Produce one row per meal, ascending by `eaten_at`.
    ///
    /// Raw series are narrowed once to the span the cohort can reach before
    /// the per-meal loop, so a long history is never rescanned per meal.
    /// An empty cohort yields an empty dataset.
    pub fn assemble(
        &self,
        meals: &[MealEvent],
        glucose: &GlucoseSeries,
        workouts: &[Workout],
        exercise_sets: &[ExerciseSet],
    ) -> Dataset {
        if meals.is_empty() {
            info!("empty meal cohort, producing empty dataset");
            return Dataset::default();
        }

        let mut sorted: Vec<&MealEvent> = meals.iter().collect();
        sorted.sort_by_key(|m| m.eaten_at);

        let (span_start, span_end) =
            self.required_span(sorted[0].eaten_at, sorted[sorted.len() - 1].eaten_at);
        let glucose = glucose.restricted(span_start, span_end);
        let workouts: Vec<Workout> = workouts
            .iter()
            .filter(|w| w.start_at >= span_start && w.start_at <= span_end)
            .cloned()
            .collect();
        let exercise_sets: Vec<ExerciseSet> = exercise_sets
            .iter()
            .filter(|s| s.performed_at >= span_start && s.performed_at <= span_end)
            .cloned()
            .collect();

        let gaps: Vec<Value> = std::iter::once(Value::UNKNOWN)
            .chain(
                sorted
                    .windows(2)
                    .map(|w| Value::known(minutes_between(w[0].eaten_at, w[1].eaten_at))),
            )
            .collect();

        let pre_context = f64::from(self.config.pre_context_minutes);
        let post = f64::from(self.config.post_minutes);

        let rows: Vec<MealRow> = sorted
            .par_iter()
            .zip(gaps.par_iter())
            .map(|(&meal, &gap)| {
                let window = glucose.slice_relative(meal.eaten_at, -pre_context, post);
                let features =
                    self.features
                        .extract(meal, gap, &window, &workouts, &exercise_sets);
                let targets = self.targets.extract(&window);
                debug!(
                    meal_event_id = meal.id,
                    egv_points = window.len(),
                    "assembled meal row"
                );
                MealRow {
                    meal_event_id: meal.id,
                    eaten_at: meal.eaten_at,
                    features,
                    targets,
                    egv_points_in_window: window.len(),
                }
            })
            .collect();

        let labeled = rows
            .iter()
            .filter(|r| r.targets.target_values().iter().all(Value::is_known))
            .count();
        info!(
            meals = rows.len(),
            labeled,
            low_confidence = rows.len() - labeled,
            "assembled meal dataset"
        );

        Dataset::new(rows)
    }

    /// The raw-series span any meal between `first` and `last` can reach.
    fn required_span(
        &self,
        first: DateTime<Utc>,
        last: DateTime<Utc>,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        let lookback = self
            .config
            .pre_context_minutes
            .max(self.config.activity_pre_minutes);
        let lookahead = self.config.post_minutes.max(self.config.activity_post_minutes);
        (
            first - minutes_duration(f64::from(lookback)),
            last + minutes_duration(f64::from(lookahead)),
        )
    }
}
