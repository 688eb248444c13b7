// src/error.rs
//! Unified error handling
//!
//! Errors only originate at the boundary: configuration, table I/O, and
//! the trained-artifact contract. Insufficient data inside the numeric core
//! is not an error — it resolves to [`crate::model::Value::UNKNOWN`] and
//! flows through to the output row.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum GlucoseError {
    /// Configuration loading or validation failed.
    #[error("configuration error: {0}")]
    Configuration(#[from] crate::config::ConfigError),

    /// Malformed input at the boundary (bad timestamp, bad identifier).
    #[error("invalid input in {field}: {reason}")]
    InvalidInput {
        /// Field or column that failed to parse.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Dataset table violates the fixed schema.
    #[error("dataset table error: {0}")]
    Table(String),

    /// Underlying CSV reader/writer failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Trained artifact expects feature columns this engine does not produce.
    #[error("feature column mismatch, unknown columns: {missing:?}")]
    FeatureColumnMismatch {
        /// Columns named by the artifact but not produced here.
        missing: Vec<String>,
    },

    /// Trained artifact metadata is inconsistent.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Filesystem failure while reading or writing artifacts.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact metadata failed to parse.
    #[error("artifact metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let err = GlucoseError::InvalidInput {
            field: "eaten_at".to_string(),
            reason: "not a timestamp".to_string(),
        };
        assert!(err.to_string().contains("eaten_at"));

        let err = GlucoseError::FeatureColumnMismatch {
            missing: vec!["bogus_col".to_string()],
        };
        assert!(err.to_string().contains("bogus_col"));
    }
}
