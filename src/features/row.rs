//! Normalized feature rows.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::category::CategoryCode;

/// A field of a request record before normalization.
///
/// The set of kinds is closed: normalization matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    /// Plain integer field.
    Integer(i64),
    /// Plain floating point field.
    Float(f64),
    /// Enumerated field, carried as its code.
    Category(CategoryCode),
}

/// A scalar value in a normalized row.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Label(String),
}

impl FeatureValue {
    /// Numeric value, or `None` for labels.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Label(_) => None,
        }
    }

    /// Label value, or `None` for numbers.
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Label(l) => Some(l),
            _ => None,
        }
    }
}

impl From<Field> for FeatureValue {
    fn from(field: Field) -> Self {
        match field {
            Field::Integer(v) => Self::Int(v),
            Field::Float(v) => Self::Float(v),
            Field::Category(CategoryCode::Text(code)) => Self::Label(code.to_string()),
            Field::Category(CategoryCode::Int(code)) => Self::Int(code),
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Label(l) => f.write_str(l),
        }
    }
}

impl Serialize for FeatureValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Label(l) => serializer.serialize_str(l),
        }
    }
}

/// Ordered `(name, value)` pairs in training-time column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureRow {
    fields: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRow {
    /// Create a row from ordered pairs.
    pub fn from_pairs(fields: Vec<(&'static str, FeatureValue)>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a value by field name.
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(n, _)| *n)
    }

    /// Iterate `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
        self.fields.iter().map(|(n, v)| (*n, v))
    }
}

impl Serialize for FeatureRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
