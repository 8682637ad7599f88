//! Named-column frame.
//!
//! A [`Frame`] is the unit that preprocessing stages fit on and transform.
//! Columns keep insertion order, which is the training-time column order.

use ndarray::{Array1, ArrayView1};
use thiserror::Error;

use crate::features::{FeatureRow, FeatureValue};

/// Errors raised while assembling a frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// A column has a different number of rows than the frame.
    #[error("column `{column}` has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// No column with this name exists.
    #[error("column `{0}` not found")]
    MissingColumn(String),

    /// Two columns share a name.
    #[error("duplicate column `{0}`")]
    DuplicateColumn(String),

    /// A row carries a value of the wrong kind for its column.
    #[error("row {row}: column `{column}` expects a {expected} value")]
    KindMismatch {
        row: usize,
        column: String,
        expected: &'static str,
    },

    /// A row does not have the same fields as the first row.
    #[error("row {row}: expected field `{expected}` at position {position}, found `{found}`")]
    SchemaMismatch {
        row: usize,
        position: usize,
        expected: String,
        found: String,
    },
}

/// A single column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Integer and floating point fields, stored as `f64`.
    Numeric(Array1<f64>),
    /// Label-valued fields.
    Categorical(Vec<String>),
}

impl Column {
    /// Number of values in the column.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Categorical(v) => v.len(),
        }
    }

    /// Returns true if the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true for numeric columns.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }

    /// Numeric view of the column, if numeric.
    pub fn as_numeric(&self) -> Option<ArrayView1<'_, f64>> {
        match self {
            Self::Numeric(v) => Some(v.view()),
            Self::Categorical(_) => None,
        }
    }

    /// Labels of the column, if categorical.
    pub fn as_categorical(&self) -> Option<&[String]> {
        match self {
            Self::Categorical(v) => Some(v),
            Self::Numeric(_) => None,
        }
    }
}

/// Ordered collection of equally long named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a frame from `(name, column)` pairs.
    ///
    /// The first column fixes the row count.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut frame = Self::new();
        for (name, column) in columns {
            frame.push_column(name, column)?;
        }
        Ok(frame)
    }

    /// Build a frame from normalized feature rows.
    ///
    /// The first row fixes the schema: integer and float values become
    /// numeric columns, labels become categorical columns.
    pub fn from_rows(rows: &[FeatureRow]) -> Result<Self, FrameError> {
        let Some(first) = rows.first() else {
            return Ok(Self::new());
        };

        let mut numeric: Vec<Option<Vec<f64>>> = Vec::with_capacity(first.len());
        let mut labels: Vec<Option<Vec<String>>> = Vec::with_capacity(first.len());
        for (_, value) in first.iter() {
            match value {
                FeatureValue::Label(_) => {
                    numeric.push(None);
                    labels.push(Some(Vec::with_capacity(rows.len())));
                }
                _ => {
                    numeric.push(Some(Vec::with_capacity(rows.len())));
                    labels.push(None);
                }
            }
        }

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != first.len() {
                return Err(FrameError::LengthMismatch {
                    column: format!("row {row_idx}"),
                    expected: first.len(),
                    actual: row.len(),
                });
            }
            for (pos, ((name, value), (expected, _))) in row.iter().zip(first.iter()).enumerate() {
                if name != expected {
                    return Err(FrameError::SchemaMismatch {
                        row: row_idx,
                        position: pos,
                        expected: expected.to_string(),
                        found: name.to_string(),
                    });
                }
                match (value, &mut numeric[pos], &mut labels[pos]) {
                    (FeatureValue::Label(l), _, Some(col)) => col.push(l.clone()),
                    (FeatureValue::Label(_), _, None) => {
                        return Err(FrameError::KindMismatch {
                            row: row_idx,
                            column: name.to_string(),
                            expected: "numeric",
                        });
                    }
                    (v, Some(col), _) => col.push(v.as_f64().unwrap_or(f64::NAN)),
                    (_, None, _) => {
                        return Err(FrameError::KindMismatch {
                            row: row_idx,
                            column: name.to_string(),
                            expected: "categorical",
                        });
                    }
                }
            }
        }

        let columns = first
            .iter()
            .zip(numeric.into_iter().zip(labels))
            .map(|((name, _), (num, lab))| {
                let column = match (num, lab) {
                    (Some(v), _) => Column::Numeric(Array1::from(v)),
                    (None, Some(v)) => Column::Categorical(v),
                    (None, None) => Column::Categorical(Vec::new()),
                };
                (name.to_string(), column)
            });
        Self::from_columns(columns)
    }

    /// Append a column.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), FrameError> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(FrameError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(FrameError::LengthMismatch {
                column: name,
                expected: self.n_rows,
                actual: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Numeric view of a column; `None` if absent or categorical.
    pub fn numeric(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.column(name).and_then(Column::as_numeric)
    }

    /// Iterate `(name, column)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Replace the values of an existing numeric column.
    pub(crate) fn replace_numeric(&mut self, name: &str, values: Array1<f64>) -> Result<(), FrameError> {
        let expected = self.n_rows;
        let idx = self
            .position(name)
            .ok_or_else(|| FrameError::MissingColumn(name.to_string()))?;
        if values.len() != expected {
            return Err(FrameError::LengthMismatch {
                column: name.to_string(),
                expected,
                actual: values.len(),
            });
        }
        match &mut self.columns[idx] {
            Column::Numeric(v) => {
                *v = values;
                Ok(())
            }
            Column::Categorical(_) => Err(FrameError::KindMismatch {
                row: 0,
                column: name.to_string(),
                expected: "numeric",
            }),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
