// src/model/value.rs
//! Explicit known/unknown numeric values
//!
//! Every statistic in this crate can fail its quality gate, so the numeric
//! type carries "unknown" explicitly instead of smuggling it through NaN.
//! Arithmetic propagates unknown; conversion back to `f64` yields NaN only
//! at the boundary to external regressors and tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A real number that may be unknown due to insufficient or missing data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(Option<f64>);

impl Value {
    /// The unknown sentinel.
    pub const UNKNOWN: Value = Value(None);

    /// Wrap a known number. Non-finite input collapses to unknown.
    pub fn known(v: f64) -> Self {
        if v.is_finite() {
            Value(Some(v))
        } else {
            Value(None)
        }
    }

    /// Construct the unknown value.
    pub fn unknown() -> Self {
        Value(None)
    }

    /// Whether a number is present.
    pub fn is_known(&self) -> bool {
        self.0.is_some()
    }

    /// Whether the value is unknown.
    pub fn is_unknown(&self) -> bool {
        self.0.is_none()
    }

    /// The inner number, if known.
    pub fn get(&self) -> Option<f64> {
        self.0
    }

    /// The inner number, or `default` when unknown.
    pub fn unwrap_or(&self, default: f64) -> f64 {
        self.0.unwrap_or(default)
    }

    /// Bridge to plain floats: unknown becomes NaN.
    ///
    /// Only intended for the table/regressor boundary; core logic should
    /// stay in `Value`.
    pub fn to_f64(&self) -> f64 {
        self.0.unwrap_or(f64::NAN)
    }

    /// Apply `f` to a known number, propagating unknown.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self.0 {
            Some(v) => Value::known(f(v)),
            None => Value::UNKNOWN,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::known(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(v) => Value::known(v),
            None => Value::UNKNOWN,
        }
    }
}

impl Add for Value {
    type Output = Value;

    fn add(self, rhs: Value) -> Value {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Value::known(a + b),
            _ => Value::UNKNOWN,
        }
    }
}

impl Sub for Value {
    type Output = Value;

    fn sub(self, rhs: Value) -> Value {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Value::known(a - b),
            _ => Value::UNKNOWN,
        }
    }
}

impl Mul for Value {
    type Output = Value;

    fn mul(self, rhs: Value) -> Value {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Value::known(a * b),
            _ => Value::UNKNOWN,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "unknown"),
        }
    }
}
