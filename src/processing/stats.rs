// src/processing/stats.rs
//! Statistical primitives shared by feature and target extraction

use crate::model::Value;

/// Minimum finite pairs for a least-squares fit. Below this the slope is
/// numerically unstable, so it resolves to unknown. Fixed by design, not
/// configurable.
pub const MIN_SLOPE_POINTS: usize = 3;

/// Ordinary least-squares slope of y over x.
///
/// Pairs with a non-finite abscissa or an unknown ordinate are ignored.
/// Returns unknown with fewer than [`MIN_SLOPE_POINTS`] usable pairs, or
/// when every x coincides.
pub fn linear_slope(pairs: impl IntoIterator<Item = (f64, Value)>) -> Value {
    let pts: Vec<(f64, f64)> = pairs
        .into_iter()
        .filter_map(|(x, y)| match y.get() {
            Some(y) if x.is_finite() => Some((x, y)),
            _ => None,
        })
        .collect();
    if pts.len() < MIN_SLOPE_POINTS {
        return Value::UNKNOWN;
    }

    let n = pts.len() as f64;
    let mean_x = pts.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pts.iter().map(|(_, y)| y).sum::<f64>() / n;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in &pts {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx == 0.0 {
        return Value::UNKNOWN;
    }
    Value::known(sxy / sxx)
}

/// Trapezoidal integral over a fixed-step grid.
///
/// Unknown values contribute 0 rather than being excluded, biasing sparse
/// coverage toward under-counting. Returns 0.0 with fewer than 2 points or
/// when every value is unknown.
pub fn trapezoid(values: &[Value], step: f64) -> f64 {
    if values.len() < 2 || values.iter().all(|v| v.is_unknown()) {
        return 0.0;
    }
    let y: Vec<f64> = values.iter().map(|v| v.unwrap_or(0.0)).collect();
    y.windows(2).map(|w| step * (w[0] + w[1]) / 2.0).sum()
}

/// Median of known values; unknown when empty.
pub fn median(values: &[f64]) -> Value {
    if values.is_empty() {
        return Value::UNKNOWN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Value::known(sorted[mid])
    } else {
        Value::known((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Mean and population standard deviation; both unknown when empty.
pub fn mean_population_std(values: &[f64]) -> (Value, Value) {
    if values.is_empty() {
        return (Value::UNKNOWN, Value::UNKNOWN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (Value::known(mean), Value::known(var.sqrt()))
}
