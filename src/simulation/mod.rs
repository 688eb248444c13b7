// src/simulation/mod.rs
//! Synthetic cohort generation
//!
//! Deterministic, seeded cohorts with a known analytic shape: each meal
//! produces a linear rise followed by a linear decay back to baseline.
//! Integration tests and benches use these to assert targets against the
//! constructed ground truth instead of recorded fixtures.

use crate::model::{
    ExerciseSet, FoodPortion, GlucoseSample, GlucoseSeries, MealEvent, Workout,
};
use crate::processing::features::sum_meal_macros;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shape of the generated cohort.
#[derive(Debug, Clone)]
pub struct CohortConfig {
    /// Number of meals.
    pub meal_count: usize,
    /// Minutes between consecutive meal anchors.
    pub meal_spacing_minutes: i64,
    /// Resting glucose level, mg/dL.
    pub baseline_mgdl: f64,
    /// Post-meal rise rate, mg/dL per minute.
    pub rise_mgdl_per_min: f64,
    /// Minutes of rise after each meal.
    pub rise_minutes: f64,
    /// Minutes to decay back to baseline after the peak.
    pub decay_minutes: f64,
    /// Sensor cadence, minutes.
    pub sample_interval_minutes: i64,
    /// Uniform noise amplitude, mg/dL. Zero gives an exact trace.
    pub noise_mgdl: f64,
    /// RNG seed; same seed, same cohort.
    pub seed: u64,
}

impl Default for CohortConfig {
    fn default() -> Self {
        Self {
            meal_count: 3,
            meal_spacing_minutes: 300,
            baseline_mgdl: 95.0,
            rise_mgdl_per_min: 1.0,
            rise_minutes: 60.0,
            decay_minutes: 90.0,
            sample_interval_minutes: 5,
            noise_mgdl: 0.0,
            seed: 7,
        }
    }
}

/// A generated cohort with all raw series the assembler consumes.
#[derive(Debug, Clone)]
pub struct SyntheticCohort {
    pub meals: Vec<MealEvent>,
    pub glucose: GlucoseSeries,
    pub workouts: Vec<Workout>,
    pub exercise_sets: Vec<ExerciseSet>,
}

/// Generates synthetic cohorts.
pub struct CohortGenerator {
    config: CohortConfig,
    rng: StdRng,
}

impl CohortGenerator {
    /// Build a generator for the given shape.
    pub fn new(config: CohortConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// First meal anchor; fixed so generated timestamps are reproducible.
    pub fn first_meal_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    /// Generate the full cohort.
    pub fn generate(&mut self) -> SyntheticCohort {
        let meal_times: Vec<DateTime<Utc>> = (0..self.config.meal_count)
            .map(|i| Self::first_meal_at() + Duration::minutes(i as i64 * self.config.meal_spacing_minutes))
            .collect();

        let meals = meal_times
            .iter()
            .enumerate()
            .map(|(i, &eaten_at)| {
                let grams = 150.0 + self.rng.gen_range(0.0..200.0);
                let item = FoodPortion {
                    grams,
                    serving_grams: 100.0,
                    calories_kcal: 250.0,
                    carbs_g: 40.0,
                    fiber_g: 3.0,
                    protein_g: 12.0,
                    fat_g: 8.0,
                };
                MealEvent {
                    id: i as u64 + 1,
                    eaten_at,
                    macros: sum_meal_macros(&[item]),
                }
            })
            .collect();

        let glucose = self.glucose_trace(&meal_times);
        let workouts = self.workouts(&meal_times);
        let exercise_sets = self.exercise_sets(&meal_times);

        SyntheticCohort {
            meals,
            glucose,
            workouts,
            exercise_sets,
        }
    }

    /// Glucose response of one meal at `dt` minutes after its anchor.
    fn meal_response(&self, dt: f64) -> f64 {
        let peak = self.config.rise_mgdl_per_min * self.config.rise_minutes;
        if dt < 0.0 {
            0.0
        } else if dt <= self.config.rise_minutes {
            self.config.rise_mgdl_per_min * dt
        } else if dt <= self.config.rise_minutes + self.config.decay_minutes {
            peak * (1.0 - (dt - self.config.rise_minutes) / self.config.decay_minutes)
        } else {
            0.0
        }
    }

    fn glucose_trace(&mut self, meal_times: &[DateTime<Utc>]) -> GlucoseSeries {
        if meal_times.is_empty() {
            return GlucoseSeries::default();
        }
        let start = meal_times[0] - Duration::minutes(180);
        let end = *meal_times.last().unwrap() + Duration::minutes(240);
        let step = self.config.sample_interval_minutes;
        let count = ((end - start).num_minutes() / step) as i64;

        let samples = (0..=count)
            .map(|i| {
                let measured_at = start + Duration::minutes(i * step);
                let response: f64 = meal_times
                    .iter()
                    .map(|&m| self.meal_response((measured_at - m).num_minutes() as f64))
                    .sum();
                let noise = if self.config.noise_mgdl > 0.0 {
                    (self.rng.gen::<f64>() - 0.5) * 2.0 * self.config.noise_mgdl
                } else {
                    0.0
                };
                GlucoseSample {
                    measured_at,
                    glucose_mgdl: self.config.baseline_mgdl + response + noise,
                }
            })
            .collect();
        GlucoseSeries::new(samples)
    }

    fn workouts(&mut self, meal_times: &[DateTime<Utc>]) -> Vec<Workout> {
        // one morning session two hours before every other meal
        meal_times
            .iter()
            .step_by(2)
            .map(|&m| {
                let start_at = m - Duration::minutes(120);
                let duration = 30.0 + self.rng.gen_range(0.0..30.0);
                Workout {
                    start_at,
                    end_at: start_at + Duration::minutes(duration as i64),
                    duration_min: Some(duration),
                    active_energy_kcal: Some(duration * 8.0),
                    avg_hr_bpm: Some(120.0 + self.rng.gen_range(0.0..30.0)),
                    activity_type: "cycling".to_string(),
                }
            })
            .collect()
    }

    fn exercise_sets(&mut self, meal_times: &[DateTime<Utc>]) -> Vec<ExerciseSet> {
        let mut sets = Vec::new();
        for &m in meal_times.iter().skip(1).step_by(2) {
            for _ in 0..3 {
                sets.push(ExerciseSet {
                    performed_at: m - Duration::minutes(self.rng.gen_range(30..90)),
                    name: "deadlift".to_string(),
                    reps: Some(self.rng.gen_range(5..12)),
                    weight_kg: Some(60.0 + self.rng.gen_range(0.0..40.0)),
                });
            }
        }
        sets
    }
}
