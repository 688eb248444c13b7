// src/dataset/table.rs
//! Delimited-table round-trip for the assembled dataset
//!
//! The produced artifact is a CSV with a fixed header. Unknown cells are
//! written as empty fields and parse back to unknown; timestamps round-trip
//! through RFC 3339.

use crate::dataset::{Dataset, MealRow};
use crate::error::GlucoseError;
use crate::model::{MealMacros, Value};
use crate::processing::features::{
    ActivityFeatures, ContextFeatures, FeatureRow, TemporalFeatures, FEATURE_COLUMNS,
};
use crate::processing::targets::{TargetRow, TARGET_COLUMNS};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// The fixed table header, in write order.
pub fn columns() -> Vec<&'static str> {
    let mut cols = vec!["meal_event_id", "eaten_at"];
    cols.extend_from_slice(FEATURE_COLUMNS);
    cols.extend_from_slice(TARGET_COLUMNS);
    cols.push("egv_points_in_window");
    cols
}

/// Write the dataset as CSV.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<(), GlucoseError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(columns())?;

    for row in dataset.rows() {
        let mut record: Vec<String> = Vec::with_capacity(columns().len());
        record.push(row.meal_event_id.to_string());
        record.push(row.eaten_at.to_rfc3339_opts(SecondsFormat::Secs, true));
        for value in row.features.feature_values() {
            record.push(value_cell(value));
        }
        for value in row.targets.target_values() {
            record.push(value_cell(value));
        }
        record.push(row.egv_points_in_window.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the dataset to a CSV file.
pub fn write_csv_path<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<(), GlucoseError> {
    let file = File::create(path.as_ref())?;
    write_csv(dataset, file)?;
    info!(rows = dataset.len(), path = %path.as_ref().display(), "wrote dataset table");
    Ok(())
}

/// Read a dataset back from CSV produced by [`write_csv`].
///
/// The header must match the fixed schema exactly; anything else is a
/// [`GlucoseError::Table`].
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, GlucoseError> {
    let mut reader = csv::Reader::from_reader(reader);

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let expected = columns();
    if header != expected {
        return Err(GlucoseError::Table(format!(
            "unexpected header: got {} columns, expected {}",
            header.len(),
            expected.len()
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != expected.len() {
            return Err(GlucoseError::Table(format!(
                "row {} has {} fields, expected {}",
                rows.len() + 1,
                record.len(),
                expected.len()
            )));
        }
        rows.push(parse_row(&record)?);
    }

    Ok(Dataset::new(rows))
}

/// Read a dataset from a CSV file.
pub fn read_csv_path<P: AsRef<Path>>(path: P) -> Result<Dataset, GlucoseError> {
    let file = File::open(path.as_ref())?;
    let dataset = read_csv(file)?;
    info!(rows = dataset.len(), path = %path.as_ref().display(), "read dataset table");
    Ok(dataset)
}

fn value_cell(value: Value) -> String {
    match value.get() {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

fn parse_value(cell: &str, field: &str) -> Result<Value, GlucoseError> {
    if cell.is_empty() {
        return Ok(Value::UNKNOWN);
    }
    cell.parse::<f64>()
        .map(Value::known)
        .map_err(|e| GlucoseError::InvalidInput {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

fn parse_known_f64(cell: &str, field: &str) -> Result<f64, GlucoseError> {
    cell.parse::<f64>().map_err(|e| GlucoseError::InvalidInput {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Positional cursor over one record, pairing cells with column names for
/// error reporting.
struct Fields<'a> {
    record: &'a csv::StringRecord,
    names: Vec<&'static str>,
    idx: usize,
}

impl<'a> Fields<'a> {
    fn new(record: &'a csv::StringRecord) -> Self {
        Self {
            record,
            names: columns(),
            idx: 0,
        }
    }

    fn next(&mut self) -> (&'a str, &'static str) {
        let pair = (
            self.record.get(self.idx).unwrap_or_default(),
            self.names[self.idx],
        );
        self.idx += 1;
        pair
    }

    fn known(&mut self) -> Result<f64, GlucoseError> {
        let (cell, name) = self.next();
        parse_known_f64(cell, name)
    }

    fn value(&mut self) -> Result<Value, GlucoseError> {
        let (cell, name) = self.next();
        parse_value(cell, name)
    }
}

fn parse_row(record: &csv::StringRecord) -> Result<MealRow, GlucoseError> {
    let mut fields = Fields::new(record);

    let (cell, name) = fields.next();
    let meal_event_id = cell.parse::<u64>().map_err(|e| GlucoseError::InvalidInput {
        field: name.to_string(),
        reason: e.to_string(),
    })?;

    let (cell, name) = fields.next();
    let eaten_at: DateTime<Utc> = DateTime::parse_from_rfc3339(cell)
        .map_err(|e| GlucoseError::InvalidInput {
            field: name.to_string(),
            reason: e.to_string(),
        })?
        .with_timezone(&Utc);

    // feature block, in FEATURE_COLUMNS order
    let temporal = TemporalFeatures {
        meal_hour: fields.known()?,
        meal_dow: fields.known()?,
        meal_is_weekend: fields.known()?,
    };
    let macros = MealMacros {
        grams: fields.value()?,
        calories_kcal: fields.value()?,
        carbs_g: fields.value()?,
        fiber_g: fields.value()?,
        protein_g: fields.value()?,
        fat_g: fields.value()?,
    };
    let context = ContextFeatures {
        baseline_mgdl: fields.value()?,
        pre_slope_mgdl_per_min: fields.value()?,
        pre_mean_mgdl: fields.value()?,
        pre_std_mgdl: fields.value()?,
    };
    let activity = ActivityFeatures {
        workout_count_pre: fields.known()?,
        workout_minutes_pre: fields.known()?,
        workout_energy_kcal_pre: fields.known()?,
        workout_count_post: fields.known()?,
        workout_minutes_post: fields.known()?,
        workout_energy_kcal_post: fields.known()?,
        exercise_set_count_pre: fields.known()?,
        exercise_set_volume_pre: fields.known()?,
        exercise_set_count_post: fields.known()?,
        exercise_set_volume_post: fields.known()?,
    };
    let minutes_since_prev_meal = fields.value()?;

    let targets = TargetRow {
        baseline_mgdl: context.baseline_mgdl,
        peak_mgdl: fields.value()?,
        peak_inc_mgdl: fields.value()?,
        incremental_auc_mgdl_min: fields.value()?,
        slope_0_60_mgdl_per_min: fields.value()?,
    };

    let (cell, name) = fields.next();
    let egv_points_in_window =
        cell.parse::<usize>().map_err(|e| GlucoseError::InvalidInput {
            field: name.to_string(),
            reason: e.to_string(),
        })?;

    Ok(MealRow {
        meal_event_id,
        eaten_at,
        features: FeatureRow {
            temporal,
            macros,
            context,
            activity,
            minutes_since_prev_meal,
        },
        targets,
        egv_points_in_window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MealWindowConfig;
    use crate::dataset::DatasetAssembler;
    use crate::model::{GlucoseSample, GlucoseSeries, MealEvent, MealMacros};
    use chrono::{Duration, TimeZone};

    fn sample_dataset() -> Dataset {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let meals = vec![
            MealEvent {
                id: 1,
                eaten_at: t0,
                macros: MealMacros::unknown(),
            },
            MealEvent {
                id: 2,
                eaten_at: t0 + Duration::minutes(300),
                macros: MealMacros::unknown(),
            },
        ];
        let glucose = GlucoseSeries::new(
            (-24..=96)
                .map(|i| GlucoseSample {
                    measured_at: t0 + Duration::minutes(i * 5),
                    glucose_mgdl: 100.0 + (i as f64 / 3.0),
                })
                .collect(),
        );
        DatasetAssembler::new(&MealWindowConfig::default()).assemble(&meals, &glucose, &[], &[])
    }

    #[test]
    fn test_header_shape() {
        let cols = columns();
        assert_eq!(cols.len(), 2 + FEATURE_COLUMNS.len() + TARGET_COLUMNS.len() + 1);
        assert_eq!(cols[0], "meal_event_id");
        assert_eq!(*cols.last().unwrap(), "egv_points_in_window");
    }

    #[test]
    fn test_round_trip_preserves_rows() {
        let dataset = sample_dataset();
        let mut buf = Vec::new();
        write_csv(&dataset, &mut buf).unwrap();
        let parsed = read_csv(buf.as_slice()).unwrap();

        assert_eq!(parsed.len(), dataset.len());
        for (a, b) in dataset.rows().iter().zip(parsed.rows()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_unknown_round_trips_as_empty_field() {
        let dataset = sample_dataset();
        let mut buf = Vec::new();
        write_csv(&dataset, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();

        // every macro cell is unknown in this fixture
        let first_row = text.lines().nth(1).unwrap();
        assert!(first_row.contains(",,"));

        let parsed = read_csv(buf.as_slice()).unwrap();
        assert!(parsed.rows()[0].features.macros.grams.is_unknown());
    }

    #[test]
    fn test_empty_dataset_round_trips() {
        let mut buf = Vec::new();
        write_csv(&Dataset::default(), &mut buf).unwrap();
        let parsed = read_csv(buf.as_slice()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_wrong_header_is_rejected() {
        let text = "a,b,c\n1,2,3\n";
        assert!(matches!(
            read_csv(text.as_bytes()),
            Err(GlucoseError::Table(_))
        ));
    }

    #[test]
    fn test_malformed_cell_is_rejected() {
        let dataset = sample_dataset();
        let mut buf = Vec::new();
        write_csv(&dataset, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap().replace("2024-03-01T08:00:00Z", "yesterday");
        assert!(matches!(
            read_csv(text.as_bytes()),
            Err(GlucoseError::InvalidInput { .. })
        ));
    }
}
