//! Glucose-Core: meal-centered glucose response feature and target engine
//!
//! This library turns irregular physiological time-series (continuous
//! glucose readings, workouts, exercise sets) and logged meal events into a
//! fixed-width, meal-centered feature/target table for supervised learning,
//! and applies a previously trained regressor to a single new meal. It
//! features:
//!
//! - Grid resampling of irregular readings with a strict no-extrapolation rule
//! - Quality-gated baseline, context, and post-meal outcome statistics
//! - Half-open pre/post activity aggregation around each meal anchor
//! - Parallel per-meal dataset assembly with a CSV round-trip artifact
//! - A trait seam for external regressors with loud feature-column checks
//!
//! # Quick Start
//!
//! ```rust
//! use glucose_core::config::MealWindowConfig;
//! use glucose_core::dataset::DatasetAssembler;
//! use glucose_core::simulation::{CohortConfig, CohortGenerator};
//!
//! let cohort = CohortGenerator::new(CohortConfig::default()).generate();
//!
//! let config = MealWindowConfig::default();
//! let dataset = DatasetAssembler::new(&config).assemble(
//!     &cohort.meals,
//!     &cohort.glucose,
//!     &cohort.workouts,
//!     &cohort.exercise_sets,
//! );
//!
//! assert_eq!(dataset.len(), cohort.meals.len());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod model;
pub mod predict;
pub mod processing;
pub mod simulation;

// Re-export commonly used types for convenience
pub use config::{validate_meal_window_config, MealWindowConfig};
pub use dataset::{Dataset, DatasetAssembler, MealRow};
pub use error::GlucoseError;
pub use model::{
    ExerciseSet, FoodPortion, GlucoseSample, GlucoseSeries, MealEvent, MealMacros,
    RelativeTimeSeries, Value, Workout,
};
pub use predict::{ArtifactSpec, MealPredictor, Regressor, RegressorArtifact};
pub use processing::features::{FeatureRow, FEATURE_COLUMNS};
pub use processing::targets::{TargetRow, TARGET_COLUMNS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "glucose-core");
    }
}
