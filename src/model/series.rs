// src/model/series.rs
//! Sorted glucose series and per-meal relative views
//!
//! The full reading history is sorted once; every per-meal slice is then a
//! binary-search range filter instead of a full scan, which keeps cohort
//! assembly at O(n log n) over the raw series.

use crate::model::{GlucoseSample, Value};
use chrono::{DateTime, Duration, Utc};

/// Time-sorted glucose reading history.
#[derive(Debug, Clone, Default)]
pub struct GlucoseSeries {
    samples: Vec<GlucoseSample>,
}

impl GlucoseSeries {
    /// Build a series, sorting samples by measurement time.
    pub fn new(mut samples: Vec<GlucoseSample>) -> Self {
        samples.sort_by_key(|s| s.measured_at);
        Self { samples }
    }

    /// Number of readings.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the series holds no readings.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All readings in ascending time order.
    pub fn samples(&self) -> &[GlucoseSample] {
        &self.samples
    }

    /// Readings with `start <= measured_at <= end`.
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> &[GlucoseSample] {
        let lo = self.samples.partition_point(|s| s.measured_at < start);
        let hi = self.samples.partition_point(|s| s.measured_at <= end);
        &self.samples[lo..hi]
    }

    /// A copy restricted to `[start, end]`, for pre-filtering a long
    /// history to the span a cohort actually needs.
    pub fn restricted(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> GlucoseSeries {
        GlucoseSeries {
            samples: self.between(start, end).to_vec(),
        }
    }

    /// Slice readings into minutes relative to `anchor`, keeping those with
    /// relative minute in `[start_minute, end_minute]`.
    pub fn slice_relative(
        &self,
        anchor: DateTime<Utc>,
        start_minute: f64,
        end_minute: f64,
    ) -> RelativeTimeSeries {
        let start = anchor + minutes_duration(start_minute);
        let end = anchor + minutes_duration(end_minute);
        let points = self
            .between(start, end)
            .iter()
            .map(|s| RelativePoint {
                minutes: minutes_between(anchor, s.measured_at),
                value: Value::known(s.glucose_mgdl),
            })
            .collect();
        RelativeTimeSeries { points }
    }
}

/// One reading expressed in minutes relative to a meal anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativePoint {
    /// Minutes relative to the anchor; negative before the meal.
    pub minutes: f64,
    /// Glucose concentration, unknown when the source value was not finite.
    pub value: Value,
}

/// Ephemeral per-meal view of the glucose series.
#[derive(Debug, Clone, Default)]
pub struct RelativeTimeSeries {
    points: Vec<RelativePoint>,
}

impl RelativeTimeSeries {
    /// Build a view from pre-relativized points.
    pub fn new(points: Vec<RelativePoint>) -> Self {
        Self { points }
    }

    /// All points in ascending time order.
    pub fn points(&self) -> &[RelativePoint] {
        &self.points
    }

    /// Number of points, including unknown-valued ones.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the view holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points with relative minute in the half-open window `[start, end)`.
    pub fn half_open(&self, start: f64, end: f64) -> impl Iterator<Item = &RelativePoint> {
        self.points
            .iter()
            .filter(move |p| p.minutes >= start && p.minutes < end)
    }

    /// Known values inside `[start, end)`.
    pub fn known_in(&self, start: f64, end: f64) -> Vec<f64> {
        self.half_open(start, end)
            .filter_map(|p| p.value.get())
            .collect()
    }
}

/// Signed minutes from `from` to `to`.
pub fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 60_000.0
}

/// A chrono duration for a (possibly fractional, possibly negative) number
/// of minutes.
pub fn minutes_duration(minutes: f64) -> Duration {
    Duration::milliseconds((minutes * 60_000.0).round() as i64)
}
