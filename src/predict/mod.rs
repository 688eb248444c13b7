// src/predict/mod.rs
//! Single-meal inference path
//!
//! Applies a previously trained regressor artifact to one new meal. The
//! feature set is computed by the same extractors as dataset assembly, so
//! training and inference can never drift apart; an artifact naming a
//! feature column this engine does not produce is rejected loudly instead
//! of being silently reindexed.

use crate::config::MealWindowConfig;
use crate::error::GlucoseError;
use crate::model::series::minutes_between;
use crate::model::{ExerciseSet, GlucoseSeries, MealEvent, Value, Workout};
use crate::processing::features::{FeatureExtractor, FEATURE_COLUMNS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use tracing::debug;

/// A fitted model for one target, supplied by an external training stack.
pub trait Regressor: Send + Sync {
    /// Predict the target from a feature vector in the artifact's column
    /// order. Unknown features arrive as NaN.
    fn predict(&self, features: &[f64]) -> f64;
}

/// Serialized artifact metadata: what the models were trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Exact ordered feature columns the models expect.
    pub feature_columns: Vec<String>,
    /// Target names, one fitted model each.
    pub targets: Vec<String>,
}

impl ArtifactSpec {
    /// Parse metadata from JSON.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, GlucoseError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// A trained artifact: metadata plus one regressor per target.
pub struct RegressorArtifact {
    spec: ArtifactSpec,
    models: HashMap<String, Box<dyn Regressor>>,
}

impl RegressorArtifact {
    /// Bundle metadata with fitted models. Every target must have a model.
    pub fn new(
        spec: ArtifactSpec,
        models: HashMap<String, Box<dyn Regressor>>,
    ) -> Result<Self, GlucoseError> {
        for target in &spec.targets {
            if !models.contains_key(target) {
                return Err(GlucoseError::Artifact(format!(
                    "no model supplied for target '{}'",
                    target
                )));
            }
        }
        Ok(Self { spec, models })
    }

    /// The ordered feature columns the models were trained on.
    pub fn feature_columns(&self) -> &[String] {
        &self.spec.feature_columns
    }

    /// Targets the artifact can predict.
    pub fn targets(&self) -> &[String] {
        &self.spec.targets
    }
}

/// Predicts meal-response targets for a single meal.
pub struct MealPredictor {
    config: MealWindowConfig,
    features: FeatureExtractor,
    artifact: RegressorArtifact,
}

impl MealPredictor {
    /// Build a predictor, verifying up front that every artifact feature
    /// column is one this engine produces.
    pub fn new(
        config: &MealWindowConfig,
        artifact: RegressorArtifact,
    ) -> Result<Self, GlucoseError> {
        let missing: Vec<String> = artifact
            .feature_columns()
            .iter()
            .filter(|c| !FEATURE_COLUMNS.contains(&c.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(GlucoseError::FeatureColumnMismatch { missing });
        }
        Ok(Self {
            config: config.clone(),
            features: FeatureExtractor::new(config),
            artifact,
        })
    }

    /// Predict every artifact target for one meal.
    ///
    /// `prev_meal_at` is the anchor of the immediately preceding meal, when
    /// one exists. Raw series may extend beyond the meal's windows; they
    /// are sliced here exactly as during dataset assembly.
    pub fn predict(
        &self,
        meal: &MealEvent,
        prev_meal_at: Option<DateTime<Utc>>,
        glucose: &GlucoseSeries,
        workouts: &[Workout],
        exercise_sets: &[ExerciseSet],
    ) -> Result<HashMap<String, f64>, GlucoseError> {
        let window = glucose.slice_relative(
            meal.eaten_at,
            -f64::from(self.config.pre_context_minutes),
            f64::from(self.config.post_minutes),
        );
        let gap = match prev_meal_at {
            Some(prev) => Value::known(minutes_between(prev, meal.eaten_at)),
            None => Value::UNKNOWN,
        };
        let row = self
            .features
            .extract(meal, gap, &window, workouts, exercise_sets);

        let by_name: HashMap<&str, Value> = row.named_values().into_iter().collect();
        let x: Vec<f64> = self
            .artifact
            .feature_columns()
            .iter()
            .map(|c| by_name[c.as_str()].to_f64())
            .collect();
        debug!(
            meal_event_id = meal.id,
            features = x.len(),
            "built inference feature vector"
        );

        let mut predictions = HashMap::new();
        for target in self.artifact.targets() {
            let model = &self.artifact.models[target];
            predictions.insert(target.clone(), model.predict(&x));
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GlucoseSample, MealMacros};
    use chrono::{Duration, TimeZone};

    /// Predicts a constant; enough to exercise the plumbing.
    struct ConstantRegressor(f64);

    impl Regressor for ConstantRegressor {
        fn predict(&self, _features: &[f64]) -> f64 {
            self.0
        }
    }

    /// Echoes the first feature, for asserting column order.
    struct FirstFeatureRegressor;

    impl Regressor for FirstFeatureRegressor {
        fn predict(&self, features: &[f64]) -> f64 {
            features[0]
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn meal() -> MealEvent {
        MealEvent {
            id: 42,
            eaten_at: t0(),
            macros: MealMacros::unknown(),
        }
    }

    fn glucose() -> GlucoseSeries {
        GlucoseSeries::new(
            (-24..=36)
                .map(|i| GlucoseSample {
                    measured_at: t0() + Duration::minutes(i * 5),
                    glucose_mgdl: 100.0,
                })
                .collect(),
        )
    }

    fn spec(columns: &[&str], targets: &[&str]) -> ArtifactSpec {
        ArtifactSpec {
            feature_columns: columns.iter().map(|s| s.to_string()).collect(),
            targets: targets.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_predicts_every_target() {
        let mut models: HashMap<String, Box<dyn Regressor>> = HashMap::new();
        models.insert("peak_inc_mgdl".to_string(), Box::new(ConstantRegressor(35.0)));
        models.insert(
            "slope_0_60_mgdl_per_min".to_string(),
            Box::new(ConstantRegressor(0.4)),
        );
        let artifact = RegressorArtifact::new(
            spec(
                &["meal_hour", "baseline_mgdl"],
                &["peak_inc_mgdl", "slope_0_60_mgdl_per_min"],
            ),
            models,
        )
        .unwrap();

        let predictor = MealPredictor::new(&MealWindowConfig::default(), artifact).unwrap();
        let predictions = predictor
            .predict(&meal(), None, &glucose(), &[], &[])
            .unwrap();
        assert_eq!(predictions["peak_inc_mgdl"], 35.0);
        assert_eq!(predictions["slope_0_60_mgdl_per_min"], 0.4);
    }

    #[test]
    fn test_feature_vector_follows_artifact_order() {
        let mut models: HashMap<String, Box<dyn Regressor>> = HashMap::new();
        models.insert("peak_inc_mgdl".to_string(), Box::new(FirstFeatureRegressor));
        let artifact = RegressorArtifact::new(
            spec(&["baseline_mgdl", "meal_hour"], &["peak_inc_mgdl"]),
            models,
        )
        .unwrap();

        let predictor = MealPredictor::new(&MealWindowConfig::default(), artifact).unwrap();
        let predictions = predictor
            .predict(&meal(), None, &glucose(), &[], &[])
            .unwrap();
        // first artifact column is the baseline, 100 for the flat trace
        assert_eq!(predictions["peak_inc_mgdl"], 100.0);
    }

    #[test]
    fn test_unknown_feature_column_fails_loudly() {
        let mut models: HashMap<String, Box<dyn Regressor>> = HashMap::new();
        models.insert("peak_inc_mgdl".to_string(), Box::new(ConstantRegressor(0.0)));
        let artifact = RegressorArtifact::new(
            spec(&["meal_hour", "not_a_feature"], &["peak_inc_mgdl"]),
            models,
        )
        .unwrap();

        let result = MealPredictor::new(&MealWindowConfig::default(), artifact);
        match result {
            Err(GlucoseError::FeatureColumnMismatch { missing }) => {
                assert_eq!(missing, vec!["not_a_feature".to_string()]);
            }
            _ => panic!("expected FeatureColumnMismatch"),
        }
    }

    #[test]
    fn test_missing_model_is_rejected() {
        let result = RegressorArtifact::new(spec(&["meal_hour"], &["peak_inc_mgdl"]), HashMap::new());
        assert!(matches!(result, Err(GlucoseError::Artifact(_))));
    }

    #[test]
    fn test_prev_meal_gap_reaches_features() {
        let mut models: HashMap<String, Box<dyn Regressor>> = HashMap::new();
        models.insert("peak_inc_mgdl".to_string(), Box::new(FirstFeatureRegressor));
        let artifact = RegressorArtifact::new(
            spec(&["minutes_since_prev_meal"], &["peak_inc_mgdl"]),
            models,
        )
        .unwrap();
        let predictor = MealPredictor::new(&MealWindowConfig::default(), artifact).unwrap();

        let with_prev = predictor
            .predict(
                &meal(),
                Some(t0() - Duration::minutes(90)),
                &glucose(),
                &[],
                &[],
            )
            .unwrap();
        assert_eq!(with_prev["peak_inc_mgdl"], 90.0);

        let without_prev = predictor
            .predict(&meal(), None, &glucose(), &[], &[])
            .unwrap();
        assert!(without_prev["peak_inc_mgdl"].is_nan());
    }

    #[test]
    fn test_artifact_spec_json_round_trip() {
        let spec = spec(&["meal_hour"], &["peak_inc_mgdl"]);
        let json = serde_json::to_string(&spec).unwrap();
        let parsed = ArtifactSpec::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(spec, parsed);
    }
}
