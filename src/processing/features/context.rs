// src/processing/features/context.rs
//! Pre-meal glucose context features

use crate::config::MealWindowConfig;
use crate::model::{RelativeTimeSeries, Value};
use crate::processing::stats::{linear_slope, mean_population_std, median};

/// Minimum known points for pre-meal mean/std. Fixed by design.
pub const MIN_CONTEXT_POINTS: usize = 3;

/// Pre-meal glucose state relative to one meal anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextFeatures {
    /// Median glucose over the baseline window, mg/dL.
    pub baseline_mgdl: Value,
    /// Trend over the baseline window, mg/dL per minute.
    pub pre_slope_mgdl_per_min: Value,
    /// Mean over the context window, mg/dL.
    pub pre_mean_mgdl: Value,
    /// Population std over the context window, mg/dL.
    pub pre_std_mgdl: Value,
}

/// Baseline glucose: median over `[-pre_baseline_minutes, 0)`, unknown
/// below the configured minimum point count.
///
/// The median resists single-reading sensor spikes that would drag a mean.
/// Shared with the target extractor so both paths agree on the reference
/// level for incremental measures.
pub fn baseline_median(series: &RelativeTimeSeries, config: &MealWindowConfig) -> Value {
    let start = -(config.pre_baseline_minutes as f64);
    let known = series.known_in(start, 0.0);
    if known.len() < config.min_points_pre_baseline {
        return Value::UNKNOWN;
    }
    median(&known)
}

/// Extracts pre-meal context features from a meal-relative series.
pub struct ContextFeatureExtractor {
    config: MealWindowConfig,
}

impl ContextFeatureExtractor {
    /// Build an extractor for the given window configuration.
    pub fn new(config: &MealWindowConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Compute context features. Each output degrades independently to
    /// unknown when its window fails its quality gate.
    pub fn extract(&self, series: &RelativeTimeSeries) -> ContextFeatures {
        let baseline_start = -(self.config.pre_baseline_minutes as f64);
        let baseline_mgdl = baseline_median(series, &self.config);

        // same short window as the baseline, so an already-rising glucose
        // shows up separately from the longer window's volatility
        let pre_slope_mgdl_per_min = linear_slope(
            series
                .half_open(baseline_start, 0.0)
                .map(|p| (p.minutes, p.value)),
        );

        let context_start = -(self.config.pre_context_minutes as f64);
        let context = series.known_in(context_start, 0.0);
        let (pre_mean_mgdl, pre_std_mgdl) = if context.len() >= MIN_CONTEXT_POINTS {
            mean_population_std(&context)
        } else {
            (Value::UNKNOWN, Value::UNKNOWN)
        };

        ContextFeatures {
            baseline_mgdl,
            pre_slope_mgdl_per_min,
            pre_mean_mgdl,
            pre_std_mgdl,
        }
    }
}
