// src/config/mod.rs
//! Meal-window configuration
//!
//! One immutable bundle of window lengths and quality thresholds shared by
//! every computation in a run. The config is threaded explicitly into each
//! extractor so per-meal work stays a pure function of its inputs.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};

use serde::{Deserialize, Serialize};

/// Window lengths and data-quality thresholds for meal-centered slicing.
/// All durations are in minutes, relative to the meal anchor.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MealWindowConfig {
    /// Baseline window `[-pre_baseline_minutes, 0)`.
    #[serde(default = "defaults::pre_baseline_minutes")]
    pub pre_baseline_minutes: u32,

    /// Context-statistics window `[-pre_context_minutes, 0)`.
    #[serde(default = "defaults::pre_context_minutes")]
    pub pre_context_minutes: u32,

    /// Post-meal outcome window `[0, post_minutes]`.
    #[serde(default = "defaults::post_minutes")]
    pub post_minutes: u32,

    /// Post-meal slope window `[0, slope_minutes]`.
    #[serde(default = "defaults::slope_minutes")]
    pub slope_minutes: u32,

    /// Resampling grid step.
    #[serde(default = "defaults::grid_minutes")]
    pub grid_minutes: u32,

    /// Activity lookback window `[-activity_pre_minutes, 0)`.
    #[serde(default = "defaults::activity_pre_minutes")]
    pub activity_pre_minutes: u32,

    /// Activity lookahead window `[0, activity_post_minutes)`.
    #[serde(default = "defaults::activity_post_minutes")]
    pub activity_post_minutes: u32,

    /// Minimum known baseline-window points for a usable baseline.
    #[serde(default = "defaults::min_points_pre_baseline")]
    pub min_points_pre_baseline: usize,

    /// Minimum known post-meal grid points for usable targets.
    #[serde(default = "defaults::min_points_post")]
    pub min_points_post: usize,
}

mod defaults {
    pub fn pre_baseline_minutes() -> u32 {
        30
    }
    pub fn pre_context_minutes() -> u32 {
        120
    }
    pub fn post_minutes() -> u32 {
        180
    }
    pub fn slope_minutes() -> u32 {
        60
    }
    pub fn grid_minutes() -> u32 {
        5
    }
    pub fn activity_pre_minutes() -> u32 {
        360
    }
    pub fn activity_post_minutes() -> u32 {
        180
    }
    pub fn min_points_pre_baseline() -> usize {
        3
    }
    pub fn min_points_post() -> usize {
        10
    }
}

impl Default for MealWindowConfig {
    fn default() -> Self {
        Self {
            pre_baseline_minutes: defaults::pre_baseline_minutes(),
            pre_context_minutes: defaults::pre_context_minutes(),
            post_minutes: defaults::post_minutes(),
            slope_minutes: defaults::slope_minutes(),
            grid_minutes: defaults::grid_minutes(),
            activity_pre_minutes: defaults::activity_pre_minutes(),
            activity_post_minutes: defaults::activity_post_minutes(),
            min_points_pre_baseline: defaults::min_points_pre_baseline(),
            min_points_post: defaults::min_points_post(),
        }
    }
}

/// Validate a meal-window configuration.
pub fn validate_meal_window_config(config: &MealWindowConfig) -> Result<(), String> {
    if config.pre_baseline_minutes == 0 {
        return Err("Baseline window must be positive".to_string());
    }
    if config.pre_context_minutes < config.pre_baseline_minutes {
        return Err("Context window must cover the baseline window".to_string());
    }
    if config.post_minutes == 0 {
        return Err("Post-meal window must be positive".to_string());
    }
    if config.slope_minutes == 0 || config.slope_minutes > config.post_minutes {
        // target logic clamps rather than checks, so reject here
        return Err("Slope window must be positive and within the post-meal window".to_string());
    }
    if config.grid_minutes == 0 {
        return Err("Grid step must be positive".to_string());
    }
    if config.grid_minutes > config.post_minutes {
        return Err("Grid step must not exceed the post-meal window".to_string());
    }
    if config.activity_pre_minutes == 0 || config.activity_post_minutes == 0 {
        return Err("Activity windows must be positive".to_string());
    }
    if config.min_points_pre_baseline == 0 || config.min_points_post == 0 {
        return Err("Quality thresholds must be at least 1".to_string());
    }
    Ok(())
}
