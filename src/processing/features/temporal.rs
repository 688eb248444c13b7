// src/processing/features/temporal.rs
//! Calendar features of the meal anchor

use chrono::{DateTime, Datelike, Timelike, Utc};

/// When-in-the-week features for one meal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalFeatures {
    /// Hour of day, 0-23.
    pub meal_hour: f64,
    /// Day of week, 0 = Monday.
    pub meal_dow: f64,
    /// 1.0 for Saturday/Sunday, else 0.0.
    pub meal_is_weekend: f64,
}

/// Derive calendar features from the UTC-normalized meal anchor.
pub fn temporal_features(eaten_at: DateTime<Utc>) -> TemporalFeatures {
    let dow = eaten_at.weekday().num_days_from_monday();
    TemporalFeatures {
        meal_hour: f64::from(eaten_at.hour()),
        meal_dow: f64::from(dow),
        meal_is_weekend: if dow >= 5 { 1.0 } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_weekday_meal() {
        // 2024-03-01 is a Friday
        let features = temporal_features(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap());
        assert_eq!(features.meal_hour, 8.0);
        assert_eq!(features.meal_dow, 4.0);
        assert_eq!(features.meal_is_weekend, 0.0);
    }

    #[test]
    fn test_weekend_meal() {
        // 2024-03-03 is a Sunday
        let features = temporal_features(Utc.with_ymd_and_hms(2024, 3, 3, 19, 5, 0).unwrap());
        assert_eq!(features.meal_hour, 19.0);
        assert_eq!(features.meal_dow, 6.0);
        assert_eq!(features.meal_is_weekend, 1.0);
    }
}
