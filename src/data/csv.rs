//! Training data loading from CSV.
//!
//! The file must have a header row naming at least the record fields and
//! the target column. Other columns are ignored.

use std::io::Read;
use std::path::Path;

use ndarray::Array1;
use thiserror::Error;

use super::frame::{Frame, FrameError};
use crate::features::{normalize, PatientRecord};

/// Errors raised while reading a training CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("cannot read training data: {0}")]
    Csv(#[from] csv::Error),

    #[error("target column `{0}` not found in header")]
    MissingTarget(String),

    #[error("line {line}: {source}")]
    Record {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: target value {value:?} is not 0, 1, `Smoker` or `Non-Smoker`")]
    InvalidTarget { line: u64, value: String },
}

/// Typed records with their 0/1 targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledRecords {
    pub records: Vec<PatientRecord>,
    pub targets: Vec<f64>,
}

impl LabeledRecords {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Normalize every record into one frame.
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let rows: Vec<_> = self.records.iter().map(normalize).collect();
        Frame::from_rows(&rows)
    }

    pub fn targets(&self) -> Array1<f64> {
        Array1::from(self.targets.clone())
    }
}

/// Read records and the `target` column from a CSV file.
pub fn read_labeled_records(path: impl AsRef<Path>, target: &str) -> Result<LabeledRecords, CsvError> {
    let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    read_from(reader, target)
}

/// Read records and the `target` column from any CSV source.
pub fn read_labeled_from<R: Read>(source: R, target: &str) -> Result<LabeledRecords, CsvError> {
    let reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);
    read_from(reader, target)
}

fn read_from<R: Read>(mut reader: csv::Reader<R>, target: &str) -> Result<LabeledRecords, CsvError> {
    let headers = reader.headers()?.clone();
    let target_idx = headers
        .iter()
        .position(|h| h == target)
        .ok_or_else(|| CsvError::MissingTarget(target.to_string()))?;

    let mut out = LabeledRecords::default();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map_or(0, |p| p.line());
        let record: PatientRecord = row
            .deserialize(Some(&headers))
            .map_err(|source| CsvError::Record { line, source })?;
        let raw = row.get(target_idx).unwrap_or_default();
        let value = parse_target(raw).ok_or_else(|| CsvError::InvalidTarget {
            line,
            value: raw.to_string(),
        })?;
        out.records.push(record);
        out.targets.push(value);
    }
    tracing::info!(n_records = out.len(), target, "read training data");
    Ok(out)
}

fn parse_target(raw: &str) -> Option<f64> {
    match raw {
        "Smoker" => return Some(1.0),
        "Non-Smoker" => return Some(0.0),
        _ => {}
    }
    match raw.parse::<f64>() {
        Ok(v) if v == 0.0 || v == 1.0 => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Flag, Gender};

    const HEADER: &str = "age,alcohol_consumption_per_week,physical_activity_minutes_per_week,diet_score,\
sleep_hours_per_day,screen_time_hours_per_day,bmi,systolic_bp,diastolic_bp,heart_rate,cholesterol_total,\
hdl_cholesterol,triglycerides,gender,ethnicity,education_level,income_level,smoking_status,\
employment_status,family_history_diabetes,hypertension_history,cardiovascular_history,diagnosed_diabetes";

    fn csv_text(rows: &[&str]) -> String {
        let mut s = String::from(HEADER);
        for r in rows {
            s.push('\n');
            s.push_str(r);
        }
        s
    }

    #[test]
    fn reads_records_and_targets() {
        let text = csv_text(&[
            "45,2,150,6.5,7.0,4.5,27.4,128,82,72,195,52,140,Male,White,Graduate,Middle,Never,Employed,1,0,0,1",
            "30,0,300,8.1,8.0,2.0,22.0,115,75,65,170,60,90,Female,Asian,No formal,Lower-Middle,Former,Student,0,0,0,0",
        ]);
        let data = read_labeled_from(text.as_bytes(), "diagnosed_diabetes").unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data.targets, vec![1.0, 0.0]);
        assert_eq!(data.records[0].gender, Gender::Male);
        assert_eq!(data.records[0].family_history_diabetes, Flag::One);
        assert_eq!(data.records[1].education_level.as_str(), "No formal");

        let frame = data.to_frame().unwrap();
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.n_columns(), 22);
    }

    #[test]
    fn missing_target_column() {
        let text = csv_text(&[]);
        let err = read_labeled_from(text.as_bytes(), "is_smoker").unwrap_err();
        assert!(matches!(err, CsvError::MissingTarget(ref t) if t == "is_smoker"));
    }

    #[test]
    fn bad_category_reports_line() {
        let text = csv_text(&[
            "45,2,150,6.5,7.0,4.5,27.4,128,82,72,195,52,140,Robot,White,Graduate,Middle,Never,Employed,1,0,0,1",
        ]);
        let err = read_labeled_from(text.as_bytes(), "diagnosed_diabetes").unwrap_err();
        assert!(matches!(err, CsvError::Record { line: 2, .. }));
    }

    #[test]
    fn target_labels() {
        assert_eq!(parse_target("Smoker"), Some(1.0));
        assert_eq!(parse_target("Non-Smoker"), Some(0.0));
        assert_eq!(parse_target("1.0"), Some(1.0));
        assert_eq!(parse_target("2"), None);
    }
}
