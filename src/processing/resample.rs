// src/processing/resample.rs
//! Resampling of irregular readings onto a uniform time grid
//!
//! Irregular CGM samples are interpolated onto a fixed-step grid so that
//! peak/AUC/slope targets are comparable across meals regardless of sensor
//! cadence. Grid points outside the observed sample range stay unknown; the
//! resampler never extrapolates.

use crate::model::{RelativeTimeSeries, Value};

/// A uniform-step series over a bounded window.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSeries {
    start_minute: f64,
    step_minutes: f64,
    values: Vec<Value>,
}

impl GridSeries {
    /// Grid time at `idx`.
    pub fn time(&self, idx: usize) -> f64 {
        self.start_minute + idx as f64 * self.step_minutes
    }

    /// All grid times in order.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.values.len()).map(|i| self.time(i))
    }

    /// Values on the grid, unknown where coverage is missing.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// (time, value) pairs in order.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, Value)> + '_ {
        self.values.iter().enumerate().map(|(i, &v)| (self.time(i), v))
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the grid holds no points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Grid step in minutes.
    pub fn step_minutes(&self) -> f64 {
        self.step_minutes
    }

    /// Number of grid points carrying a known value.
    pub fn known_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_known()).count()
    }
}

/// Resample irregular (minute, value) points onto the grid
/// `start_minute, start_minute + step, ..., end_minute`.
///
/// The final grid point lands exactly on `end_minute` (inclusive upper
/// bound). Points with a non-finite minute or unknown value are dropped
/// before interpolating; with fewer than 2 usable points every grid value
/// is unknown. Grid points strictly before the first or strictly after the
/// last usable point are unknown.
pub fn resample_to_grid(
    series: &RelativeTimeSeries,
    step_minutes: f64,
    start_minute: f64,
    end_minute: f64,
) -> GridSeries {
    // tolerate float drift so the end point is always included
    let count = ((end_minute - start_minute) / step_minutes + 1e-9).floor() as usize + 1;

    let mut pts: Vec<(f64, f64)> = series
        .points()
        .iter()
        .filter_map(|p| match p.value.get() {
            Some(v) if p.minutes.is_finite() => Some((p.minutes, v)),
            _ => None,
        })
        .collect();
    pts.sort_by(|a, b| a.0.total_cmp(&b.0));

    if pts.len() < 2 {
        return GridSeries {
            start_minute,
            step_minutes,
            values: vec![Value::UNKNOWN; count],
        };
    }

    let first = pts[0].0;
    let last = pts[pts.len() - 1].0;
    let values = (0..count)
        .map(|i| {
            let g = start_minute + i as f64 * step_minutes;
            if g < first || g > last {
                return Value::UNKNOWN;
            }
            let j = pts.partition_point(|&(t, _)| t <= g);
            if j == pts.len() {
                return Value::known(pts[pts.len() - 1].1);
            }
            let (t0, y0) = pts[j - 1];
            let (t1, y1) = pts[j];
            if t1 == t0 {
                Value::known(y0)
            } else {
                Value::known(y0 + (y1 - y0) * (g - t0) / (t1 - t0))
            }
        })
        .collect();

    GridSeries {
        start_minute,
        step_minutes,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelativePoint;
    use proptest::prelude::*;

    fn rel(points: &[(f64, f64)]) -> RelativeTimeSeries {
        RelativeTimeSeries::new(
            points
                .iter()
                .map(|&(minutes, v)| RelativePoint {
                    minutes,
                    value: Value::known(v),
                })
                .collect(),
        )
    }

    #[test]
    fn test_grid_shape_includes_end() {
        let grid = resample_to_grid(&rel(&[(0.0, 100.0), (180.0, 100.0)]), 5.0, 0.0, 180.0);
        assert_eq!(grid.len(), 37);
        assert_eq!(grid.time(0), 0.0);
        assert_eq!(grid.time(36), 180.0);
    }

    #[test]
    fn test_linear_interpolation() {
        let grid = resample_to_grid(&rel(&[(0.0, 100.0), (10.0, 120.0)]), 5.0, 0.0, 10.0);
        let v: Vec<f64> = grid.values().iter().map(|v| v.get().unwrap()).collect();
        assert_eq!(v, vec![100.0, 110.0, 120.0]);
    }

    #[test]
    fn test_no_extrapolation() {
        let grid = resample_to_grid(&rel(&[(20.0, 100.0), (40.0, 110.0)]), 10.0, 0.0, 60.0);
        assert!(grid.values()[0].is_unknown()); // t=0, before coverage
        assert!(grid.values()[1].is_unknown()); // t=10
        assert!(grid.values()[2].is_known()); // t=20
        assert!(grid.values()[4].is_known()); // t=40
        assert!(grid.values()[5].is_unknown()); // t=50, after coverage
        assert!(grid.values()[6].is_unknown()); // t=60
    }

    #[test]
    fn test_too_few_samples_yields_all_unknown() {
        let grid = resample_to_grid(&rel(&[(30.0, 100.0)]), 5.0, 0.0, 60.0);
        assert_eq!(grid.len(), 13);
        assert!(grid.values().iter().all(|v| v.is_unknown()));

        let empty = resample_to_grid(&rel(&[]), 5.0, 0.0, 60.0);
        assert!(empty.values().iter().all(|v| v.is_unknown()));
    }

    #[test]
    fn test_non_finite_samples_are_dropped() {
        let mut series = rel(&[(0.0, 100.0), (60.0, 160.0)]);
        let mut pts = series.points().to_vec();
        pts.push(RelativePoint {
            minutes: 30.0,
            value: Value::UNKNOWN,
        });
        pts.push(RelativePoint {
            minutes: f64::NAN,
            value: Value::known(500.0),
        });
        series = RelativeTimeSeries::new(pts);

        let grid = resample_to_grid(&series, 30.0, 0.0, 60.0);
        let v: Vec<f64> = grid.values().iter().map(|v| v.get().unwrap()).collect();
        assert_eq!(v, vec![100.0, 130.0, 160.0]);
    }

    #[test]
    fn test_unsorted_input_is_handled() {
        let grid = resample_to_grid(&rel(&[(60.0, 160.0), (0.0, 100.0)]), 30.0, 0.0, 60.0);
        assert_eq!(grid.values()[1].get(), Some(130.0));
    }

    #[test]
    fn test_exact_sample_hit() {
        let grid = resample_to_grid(&rel(&[(0.0, 100.0), (5.0, 140.0), (10.0, 90.0)]), 5.0, 0.0, 10.0);
        assert_eq!(grid.values()[1].get(), Some(140.0));
    }

    proptest! {
        #[test]
        fn prop_grid_length_and_bounds(
            start in -300.0f64..0.0,
            span_steps in 1usize..200,
            step in 1.0f64..30.0,
        ) {
            let end = start + span_steps as f64 * step;
            let grid = resample_to_grid(&rel(&[(start, 100.0), (end, 110.0)]), step, start, end);
            prop_assert_eq!(grid.len(), span_steps + 1);
            for t in grid.times() {
                prop_assert!(t >= start - 1e-9 && t <= end + 1e-9);
            }
        }

        #[test]
        fn prop_never_extrapolates(last_sample in 10.0f64..170.0) {
            let grid = resample_to_grid(
                &rel(&[(0.0, 100.0), (last_sample, 120.0)]),
                5.0,
                0.0,
                180.0,
            );
            for (t, v) in grid.pairs() {
                if t > last_sample {
                    prop_assert!(v.is_unknown());
                }
            }
        }
    }
}
