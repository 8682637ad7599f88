//! One-hot encoding of categorical columns.
//!
//! The encoder turns a [`Frame`] into the dense matrix the classifiers
//! consume. Output columns are the numeric columns in frame order, followed
//! by one indicator per `(categorical column, category)` in fit order.
//! Categories unseen at fit time encode as all zeros.

use ndarray::Array2;
use thiserror::Error;

use crate::data::{Column, Frame};
use crate::error::ErrorKind;

/// Errors raised by [`OneHotEncoder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// `transform` was called before `fit`.
    #[error("state error: encoder has not been fitted")]
    NotFitted,

    /// A fitted column is absent from the frame.
    #[error("configuration error: column `{0}` not found")]
    MissingColumn(String),

    /// A fitted column changed kind between fit and transform.
    #[error("configuration error: column `{column}` was {expected} at fit time")]
    KindMismatch {
        column: String,
        expected: &'static str,
    },
}

impl EncodeError {
    /// Configuration vs. state failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFitted => ErrorKind::State,
            _ => ErrorKind::Configuration,
        }
    }
}

/// Categories learned for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalColumn {
    pub name: String,
    /// Sorted, distinct.
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fitted {
    numeric: Vec<String>,
    categorical: Vec<CategoricalColumn>,
}

/// Fit/transform one-hot encoder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OneHotEncoder {
    fitted: Option<Fitted>,
}

impl OneHotEncoder {
    /// Unfitted encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a fitted encoder from stored parts.
    pub fn from_parts(numeric: Vec<String>, categorical: Vec<CategoricalColumn>) -> Self {
        Self {
            fitted: Some(Fitted {
                numeric,
                categorical,
            }),
        }
    }

    /// Returns true once `fit` has been called.
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Numeric pass-through columns, or `None` before `fit`.
    pub fn numeric_columns(&self) -> Option<&[String]> {
        self.fitted.as_ref().map(|f| f.numeric.as_slice())
    }

    /// Learned categorical columns, or `None` before `fit`.
    pub fn categorical_columns(&self) -> Option<&[CategoricalColumn]> {
        self.fitted.as_ref().map(|f| f.categorical.as_slice())
    }

    /// Width of the encoded matrix.
    pub fn n_outputs(&self) -> Option<usize> {
        let fitted = self.fitted.as_ref()?;
        Some(fitted.numeric.len() + fitted.categorical.iter().map(|c| c.categories.len()).sum::<usize>())
    }

    /// Names of the encoded columns (`column=category` for indicators).
    pub fn output_names(&self) -> Option<Vec<String>> {
        let fitted = self.fitted.as_ref()?;
        let indicators = fitted
            .categorical
            .iter()
            .flat_map(|c| c.categories.iter().map(move |cat| format!("{}={cat}", c.name)));
        Some(fitted.numeric.iter().cloned().chain(indicators).collect())
    }

    /// Record numeric columns and the distinct categories of every
    /// categorical column of `frame`.
    pub fn fit(&mut self, frame: &Frame) -> &mut Self {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for (name, column) in frame.iter() {
            match column {
                Column::Numeric(_) => numeric.push(name.to_string()),
                Column::Categorical(labels) => {
                    let mut categories = labels.clone();
                    categories.sort();
                    categories.dedup();
                    categorical.push(CategoricalColumn {
                        name: name.to_string(),
                        categories,
                    });
                }
            }
        }
        tracing::debug!(
            n_numeric = numeric.len(),
            n_categorical = categorical.len(),
            "fitted one-hot encoder"
        );
        self.fitted = Some(Fitted {
            numeric,
            categorical,
        });
        self
    }

    /// Encode `frame` into a `[n_rows, n_outputs]` matrix.
    pub fn transform(&self, frame: &Frame) -> Result<Array2<f64>, EncodeError> {
        let fitted = self.fitted.as_ref().ok_or(EncodeError::NotFitted)?;
        let width = fitted.numeric.len()
            + fitted.categorical.iter().map(|c| c.categories.len()).sum::<usize>();
        let mut out = Array2::zeros((frame.n_rows(), width));

        for (j, name) in fitted.numeric.iter().enumerate() {
            let values = match frame.column(name) {
                None => return Err(EncodeError::MissingColumn(name.clone())),
                Some(Column::Categorical(_)) => {
                    return Err(EncodeError::KindMismatch {
                        column: name.clone(),
                        expected: "numeric",
                    })
                }
                Some(Column::Numeric(values)) => values,
            };
            out.column_mut(j).assign(values);
        }

        let mut offset = fitted.numeric.len();
        for cat in &fitted.categorical {
            let labels = match frame.column(&cat.name) {
                None => return Err(EncodeError::MissingColumn(cat.name.clone())),
                Some(Column::Numeric(_)) => {
                    return Err(EncodeError::KindMismatch {
                        column: cat.name.clone(),
                        expected: "categorical",
                    })
                }
                Some(Column::Categorical(labels)) => labels,
            };
            for (i, label) in labels.iter().enumerate() {
                if let Ok(k) = cat.categories.binary_search(label) {
                    out[[i, offset + k]] = 1.0;
                }
            }
            offset += cat.categories.len();
        }

        Ok(out)
    }

    /// `fit` followed by `transform` on the same frame.
    pub fn fit_transform(&mut self, frame: &Frame) -> Result<Array2<f64>, EncodeError> {
        self.fit(frame);
        self.transform(frame)
    }
}
