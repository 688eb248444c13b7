// src/model/mod.rs
//! Domain records consumed by the feature and target engine
//!
//! All records are read-only inputs extracted by external collaborators
//! (database, sync pipeline); the engine never mutates them. Timestamps are
//! UTC-normalized at the boundary before they reach this crate.

pub mod series;
pub mod value;

pub use series::{GlucoseSeries, RelativePoint, RelativeTimeSeries};
pub use value::Value;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logged meal with its anchor timestamp and summed macro totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEvent {
    /// Opaque identity assigned by the meal source.
    pub id: u64,
    /// When the meal was eaten; origin of every relative-time window.
    pub eaten_at: DateTime<Utc>,
    /// Macro totals from the food-composition join.
    pub macros: MealMacros,
}

/// Macro totals for one meal. Each total is non-negative or unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MealMacros {
    pub grams: Value,
    pub calories_kcal: Value,
    pub carbs_g: Value,
    pub fiber_g: Value,
    pub protein_g: Value,
    pub fat_g: Value,
}

impl MealMacros {
    /// Macros with every total unknown, for meals without line items.
    pub fn unknown() -> Self {
        Self {
            grams: Value::UNKNOWN,
            calories_kcal: Value::UNKNOWN,
            carbs_g: Value::UNKNOWN,
            fiber_g: Value::UNKNOWN,
            protein_g: Value::UNKNOWN,
            fat_g: Value::UNKNOWN,
        }
    }
}

/// One meal line item: a food's per-serving composition scaled by grams eaten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPortion {
    /// Grams of this food in the meal.
    pub grams: f64,
    /// Grams per serving the composition values refer to.
    pub serving_grams: f64,
    pub calories_kcal: f64,
    pub carbs_g: f64,
    pub fiber_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
}

/// Single continuous-glucose-monitor reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlucoseSample {
    pub measured_at: DateTime<Utc>,
    /// Concentration in mg/dL, typically 40-400.
    pub glucose_mgdl: f64,
}

/// A recorded workout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Total duration in minutes, when the source reported one.
    pub duration_min: Option<f64>,
    pub active_energy_kcal: Option<f64>,
    pub avg_hr_bpm: Option<f64>,
    pub activity_type: String,
}

/// A single resistance-training set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub performed_at: DateTime<Utc>,
    pub name: String,
    pub reps: Option<u32>,
    pub weight_kg: Option<f64>,
}
