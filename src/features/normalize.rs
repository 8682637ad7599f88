//! Record → feature row normalization.

use serde_json::error::Category as JsonCategory;
use thiserror::Error;

use super::record::PatientRecord;
use super::row::{FeatureRow, FeatureValue};

/// Caller input could not be turned into a feature row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The body is not syntactically valid JSON.
    #[error("malformed request body: {0}")]
    Malformed(String),

    /// A field is missing, has the wrong type or an unknown code.
    #[error("invalid request record: {0}")]
    InvalidRecord(String),
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            JsonCategory::Syntax | JsonCategory::Eof | JsonCategory::Io => {
                Self::Malformed(err.to_string())
            }
            JsonCategory::Data => Self::InvalidRecord(err.to_string()),
        }
    }
}

/// Resolve every field of `record` to its scalar, in column order.
///
/// Categorical fields become their code (`Gender::Male` → `"Male"`,
/// `Flag::One` → `1`); numeric fields pass through.
pub fn normalize(record: &PatientRecord) -> FeatureRow {
    let fields = record
        .fields()
        .into_iter()
        .map(|(name, field)| (name, FeatureValue::from(field)))
        .collect();
    FeatureRow::from_pairs(fields)
}

/// Validate a JSON body and normalize it.
///
/// Key order in the body is irrelevant; unknown keys are ignored.
pub fn normalize_json(body: &[u8]) -> Result<FeatureRow, ValidationError> {
    let record: PatientRecord = serde_json::from_slice(body)?;
    Ok(normalize(&record))
}

/// Normalize an already parsed JSON value.
pub fn normalize_value(value: serde_json::Value) -> Result<FeatureRow, ValidationError> {
    let record: PatientRecord = serde_json::from_value(value)?;
    Ok(normalize(&record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FIELD_NAMES;
    use crate::testing::sample_record;

    #[test]
    fn normalize_keeps_column_order() {
        let row = normalize(&sample_record());
        let names: Vec<_> = row.names().collect();
        assert_eq!(names, FIELD_NAMES);
    }

    #[test]
    fn normalize_resolves_gender_to_code() {
        let row = normalize(&sample_record());
        assert_eq!(row.get("gender"), Some(&FeatureValue::Label("Male".into())));
        assert_eq!(row.get("family_history_diabetes"), Some(&FeatureValue::Int(1)));
        assert_eq!(row.get("age"), Some(&FeatureValue::Int(45)));
        assert_eq!(row.get("bmi"), Some(&FeatureValue::Float(27.4)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = normalize_json(b"{\"age\": ").unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)), "got: {err:?}");
    }

    #[test]
    fn missing_field_is_rejected() {
        let mut value = serde_json::to_value(sample_record()).unwrap();
        value.as_object_mut().unwrap().remove("bmi");
        let err = normalize_value(value).unwrap_err();
        match err {
            ValidationError::InvalidRecord(msg) => assert!(msg.contains("bmi"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
