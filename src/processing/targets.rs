// src/processing/targets.rs
//! Post-meal outcome targets
//!
//! Targets are computed on a uniform grid over the post-meal window so that
//! peak and AUC are comparable across meals with different sensor cadence.
//! A meal failing the post-window quality gate keeps its baseline but every
//! other target resolves to unknown, flagging the row as low-confidence for
//! downstream training filters.

use crate::config::MealWindowConfig;
use crate::model::{RelativeTimeSeries, Value};
use crate::processing::features::baseline_median;
use crate::processing::resample::resample_to_grid;
use crate::processing::stats::{linear_slope, trapezoid};

/// Target column names, in table order. Baseline is reported with the
/// context features, not here.
pub const TARGET_COLUMNS: &[&str] = &[
    "peak_mgdl",
    "peak_inc_mgdl",
    "incremental_auc_mgdl_min",
    "slope_0_60_mgdl_per_min",
];

/// Post-meal outcome labels for one meal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetRow {
    /// Pre-meal baseline, the reference level for incremental measures.
    pub baseline_mgdl: Value,
    /// Maximum grid glucose over the post window, mg/dL.
    pub peak_mgdl: Value,
    /// Peak rise above baseline, mg/dL.
    pub peak_inc_mgdl: Value,
    /// Incremental area under the curve above baseline, mg/dL·min.
    pub incremental_auc_mgdl_min: Value,
    /// Early post-meal trend, mg/dL per minute.
    pub slope_0_60_mgdl_per_min: Value,
}

impl TargetRow {
    /// Non-baseline target values in [`TARGET_COLUMNS`] order.
    pub fn target_values(&self) -> Vec<Value> {
        vec![
            self.peak_mgdl,
            self.peak_inc_mgdl,
            self.incremental_auc_mgdl_min,
            self.slope_0_60_mgdl_per_min,
        ]
    }

    fn low_confidence(baseline_mgdl: Value) -> Self {
        Self {
            baseline_mgdl,
            peak_mgdl: Value::UNKNOWN,
            peak_inc_mgdl: Value::UNKNOWN,
            incremental_auc_mgdl_min: Value::UNKNOWN,
            slope_0_60_mgdl_per_min: Value::UNKNOWN,
        }
    }
}

/// Extracts post-meal targets from a meal-relative series.
pub struct TargetExtractor {
    config: MealWindowConfig,
}

impl TargetExtractor {
    /// Build an extractor for the given window configuration.
    pub fn new(config: &MealWindowConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Compute targets. Every output degrades independently to unknown;
    /// a meal with partial data still yields a row.
    pub fn extract(&self, series: &RelativeTimeSeries) -> TargetRow {
        let baseline_mgdl = baseline_median(series, &self.config);

        let grid = resample_to_grid(
            series,
            f64::from(self.config.grid_minutes),
            0.0,
            f64::from(self.config.post_minutes),
        );

        if grid.known_count() < self.config.min_points_post {
            return TargetRow::low_confidence(baseline_mgdl);
        }

        let peak_mgdl = grid
            .values()
            .iter()
            .filter_map(Value::get)
            .fold(Value::UNKNOWN, |acc, v| match acc.get() {
                Some(m) if m >= v => acc,
                _ => Value::known(v),
            });

        let peak_inc_mgdl = peak_mgdl - baseline_mgdl;

        let incremental_auc_mgdl_min = match baseline_mgdl.get() {
            Some(baseline) => {
                let above: Vec<Value> = grid
                    .values()
                    .iter()
                    .map(|v| v.map(|g| (g - baseline).max(0.0)))
                    .collect();
                Value::known(trapezoid(&above, grid.step_minutes()))
            }
            None => Value::UNKNOWN,
        };

        let slope_end = f64::from(self.config.slope_minutes.min(self.config.post_minutes));
        let slope_0_60_mgdl_per_min =
            linear_slope(grid.pairs().filter(|&(t, _)| t <= slope_end + 1e-9));

        TargetRow {
            baseline_mgdl,
            peak_mgdl,
            peak_inc_mgdl,
            incremental_auc_mgdl_min,
            slope_0_60_mgdl_per_min,
        }
    }
}
