//! IQR-fence outlier clipping.
//!
//! [`IqrClipper::fit`] learns, per numeric column, the fence
//! `[Q1 - k·IQR, Q3 + k·IQR]` with `k = 1.5` by default.
//! [`IqrClipper::transform`] replaces every value outside its column's fence
//! with the median of that column in the frame being transformed.
//!
//! # Example
//!
//! ```
//! use diabeto::data::{Column, Frame};
//! use diabeto::preprocess::IqrClipper;
//! use ndarray::array;
//!
//! let frame = Frame::from_columns([
//!     ("x", Column::Numeric(array![1.0, 2.0, 3.0, 4.0, 5.0, 100.0])),
//! ]).unwrap();
//!
//! let mut clipper = IqrClipper::new();
//! clipper.fit(&frame, &["x"]).unwrap();
//! let clipped = clipper.transform(&frame).unwrap();
//!
//! assert_eq!(clipped.numeric("x").unwrap(), array![1.0, 2.0, 3.0, 4.0, 5.0, 3.5].view());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::stats::{median, quantile_sorted, sorted_values};
use crate::data::{Column, Frame};
use crate::error::ErrorKind;

/// Default fence multiplier applied to the IQR.
pub const DEFAULT_MULTIPLIER: f64 = 1.5;

/// Returns true if `multiplier` yields well-ordered fences: finite and
/// non-negative.
pub fn is_valid_multiplier(multiplier: f64) -> bool {
    multiplier.is_finite() && multiplier >= 0.0
}

/// Errors raised by [`IqrClipper`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClipError {
    /// The IQR multiplier is negative or not finite.
    #[error("configuration error: fence multiplier {0} must be finite and non-negative")]
    InvalidMultiplier(f64),

    /// A configured column is absent from the frame.
    #[error("configuration error: column `{0}` not found")]
    MissingColumn(String),

    /// A configured column is categorical.
    #[error("configuration error: column `{0}` is not numeric")]
    NonNumericColumn(String),

    /// A configured column has no finite values to estimate quartiles from.
    #[error("configuration error: column `{0}` has no values")]
    EmptyColumn(String),

    /// `transform` was called before `fit`.
    #[error("state error: clipper has not been fitted")]
    NotFitted,
}

impl ClipError {
    /// Configuration vs. state failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFitted => ErrorKind::State,
            _ => ErrorKind::Configuration,
        }
    }
}

/// Acceptable value range of one column. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fence {
    pub lower: f64,
    pub upper: f64,
}

impl Fence {
    /// Fence from quartiles and a multiplier.
    pub fn from_quartiles(q1: f64, q3: f64, multiplier: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        }
    }

    /// Returns true unless `value` lies strictly outside the fence.
    ///
    /// NaN is never an outlier.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        !(value < self.lower || value > self.upper)
    }
}

/// Fit/transform outlier clipper.
///
/// Fences are computed once by [`fit`](Self::fit) and are read-only
/// afterwards, so a fitted clipper can be shared across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct IqrClipper {
    multiplier: f64,
    fences: Option<Vec<(String, Fence)>>,
}

impl Default for IqrClipper {
    fn default() -> Self {
        Self::new()
    }
}

impl IqrClipper {
    /// Unfitted clipper with the default 1.5 multiplier.
    pub fn new() -> Self {
        Self::with_multiplier(DEFAULT_MULTIPLIER)
    }

    /// Unfitted clipper with a custom IQR multiplier.
    pub fn with_multiplier(multiplier: f64) -> Self {
        Self {
            multiplier,
            fences: None,
        }
    }

    /// Rebuild a fitted clipper from stored fences.
    pub fn from_fences(multiplier: f64, fences: Vec<(String, Fence)>) -> Self {
        Self {
            multiplier,
            fences: Some(fences),
        }
    }

    /// IQR multiplier.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Returns true once `fit` has succeeded.
    pub fn is_fitted(&self) -> bool {
        self.fences.is_some()
    }

    /// Fitted fences in column order, or `None` before `fit`.
    pub fn fences(&self) -> Option<&[(String, Fence)]> {
        self.fences.as_deref()
    }

    /// Fence of a single column.
    pub fn fence(&self, column: &str) -> Option<Fence> {
        self.fences()?
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, fence)| *fence)
    }

    /// Learn a fence for each of `columns` from `frame`.
    ///
    /// Quartiles use linear interpolation between order statistics. A column
    /// named more than once gets a single fence. On error the previous state
    /// is kept.
    pub fn fit<S: AsRef<str>>(&mut self, frame: &Frame, columns: &[S]) -> Result<&mut Self, ClipError> {
        if !is_valid_multiplier(self.multiplier) {
            return Err(ClipError::InvalidMultiplier(self.multiplier));
        }
        let mut fences: Vec<(String, Fence)> = Vec::with_capacity(columns.len());
        for column in columns {
            let name = column.as_ref();
            let values = numeric_column(frame, name)?;
            let sorted = sorted_values(values);
            let (Some(q1), Some(q3)) = (quantile_sorted(&sorted, 0.25), quantile_sorted(&sorted, 0.75))
            else {
                return Err(ClipError::EmptyColumn(name.to_string()));
            };
            let fence = Fence::from_quartiles(q1, q3, self.multiplier);
            tracing::debug!(column = name, q1, q3, lower = fence.lower, upper = fence.upper, "fitted fence");
            match fences.iter_mut().find(|(existing, _)| existing == name) {
                Some(slot) => slot.1 = fence,
                None => fences.push((name.to_string(), fence)),
            }
        }
        self.fences = Some(fences);
        Ok(self)
    }

    /// Return a copy of `frame` with outliers replaced by the column median.
    ///
    /// The median is taken over `frame` itself, not over the fit-time data.
    /// `frame` is left untouched.
    pub fn transform(&self, frame: &Frame) -> Result<Frame, ClipError> {
        let fences = self.fences.as_ref().ok_or(ClipError::NotFitted)?;
        let mut out = frame.clone();
        for (name, fence) in fences {
            let values = numeric_column(frame, name)?;
            let n_outliers = values.iter().filter(|&&v| !fence.contains(v)).count();
            if n_outliers == 0 {
                continue;
            }
            // n_outliers > 0 implies at least one non-NaN value.
            let Some(replacement) = median(values) else {
                continue;
            };
            let clipped = values.mapv(|v| if fence.contains(v) { v } else { replacement });
            tracing::trace!(column = name.as_str(), n_outliers, replacement, "clipped column");
            out.replace_numeric(name, clipped)
                .map_err(|_| ClipError::NonNumericColumn(name.clone()))?;
        }
        Ok(out)
    }

    /// `fit` followed by `transform` on the same frame.
    pub fn fit_transform<S: AsRef<str>>(&mut self, frame: &Frame, columns: &[S]) -> Result<Frame, ClipError> {
        self.fit(frame, columns)?;
        self.transform(frame)
    }
}

fn numeric_column<'a>(frame: &'a Frame, name: &str) -> Result<ndarray::ArrayView1<'a, f64>, ClipError> {
    match frame.column(name) {
        None => Err(ClipError::MissingColumn(name.to_string())),
        Some(Column::Categorical(_)) => Err(ClipError::NonNumericColumn(name.to_string())),
        Some(Column::Numeric(values)) => Ok(values.view()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    fn frame(values: Array1<f64>) -> Frame {
        Frame::from_columns([("x", Column::Numeric(values))]).unwrap()
    }

    #[test]
    fn fit_computes_iqr_fences() {
        let f = frame(array![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let mut clipper = IqrClipper::new();
        clipper.fit(&f, &["x"]).unwrap();

        let fence = clipper.fence("x").unwrap();
        assert_abs_diff_eq!(fence.lower, -1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(fence.upper, 8.5, epsilon = 1e-12);
    }

    #[test]
    fn transform_replaces_outlier_with_median() {
        let f = frame(array![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let mut clipper = IqrClipper::new();
        let out = clipper.fit_transform(&f, &["x"]).unwrap();
        assert_eq!(out.numeric("x").unwrap(), array![1.0, 2.0, 3.0, 4.0, 5.0, 3.5].view());
    }

    #[test]
    fn transform_does_not_mutate_input() {
        let f = frame(array![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let before = f.clone();
        let mut clipper = IqrClipper::new();
        let _ = clipper.fit_transform(&f, &["x"]).unwrap();
        assert_eq!(f, before);
    }

    #[test]
    fn transform_before_fit_is_state_error() {
        let f = frame(array![1.0, 2.0]);
        let err = IqrClipper::new().transform(&f).unwrap_err();
        assert_eq!(err, ClipError::NotFitted);
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn fit_missing_column_is_configuration_error() {
        let f = frame(array![1.0, 2.0]);
        let mut clipper = IqrClipper::new();
        let err = clipper.fit(&f, &["y"]).unwrap_err();
        assert_eq!(err, ClipError::MissingColumn("y".into()));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!clipper.is_fitted());
    }

    #[test]
    fn fit_categorical_column_is_configuration_error() {
        let f = Frame::from_columns([("g", Column::Categorical(vec!["a".into()]))]).unwrap();
        let err = IqrClipper::new().fit(&f, &["g"]).unwrap_err();
        assert_eq!(err, ClipError::NonNumericColumn("g".into()));
    }

    #[test]
    fn zero_variance_clips_everything_else() {
        let fit_frame = frame(array![5.0, 5.0, 5.0, 5.0]);
        let mut clipper = IqrClipper::new();
        clipper.fit(&fit_frame, &["x"]).unwrap();
        assert_eq!(clipper.fence("x"), Some(Fence { lower: 5.0, upper: 5.0 }));

        let out = clipper.transform(&frame(array![5.0, 6.0, 4.0, 5.0, 5.0])).unwrap();
        assert_eq!(out.numeric("x").unwrap(), array![5.0, 5.0, 5.0, 5.0, 5.0].view());
    }

    #[test]
    fn single_row_fence_collapses() {
        let mut clipper = IqrClipper::new();
        clipper.fit(&frame(array![42.0]), &["x"]).unwrap();
        assert_eq!(clipper.fence("x"), Some(Fence { lower: 42.0, upper: 42.0 }));
    }

    #[test]
    fn transform_uses_transform_time_median() {
        let mut clipper = IqrClipper::new();
        clipper.fit(&frame(array![1.0, 2.0, 3.0, 4.0, 5.0]), &["x"]).unwrap();

        // Fence is (-1, 7); median of the new frame is 10.
        let out = clipper.transform(&frame(array![10.0, 10.0, 10.0, 1.0, 2.0])).unwrap();
        assert_eq!(out.numeric("x").unwrap(), array![10.0, 10.0, 10.0, 1.0, 2.0].view());
    }

    #[test]
    fn nan_is_never_clipped() {
        let mut clipper = IqrClipper::new();
        let out = clipper
            .fit_transform(&frame(array![1.0, 2.0, f64::NAN, 3.0, 50.0]), &["x"])
            .unwrap();
        let x = out.numeric("x").unwrap();
        assert!(x[2].is_nan());
        assert_eq!(x[4], 2.5);
    }

    #[test]
    fn custom_multiplier_widens_fence() {
        let f = frame(array![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let mut clipper = IqrClipper::with_multiplier(3.0);
        clipper.fit(&f, &["x"]).unwrap();
        let fence = clipper.fence("x").unwrap();
        assert_abs_diff_eq!(fence.lower, -5.25, epsilon = 1e-12);
        assert_abs_diff_eq!(fence.upper, 12.25, epsilon = 1e-12);
    }

    #[rstest::rstest]
    #[case::negative(-1.0)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn fit_rejects_bad_multiplier(#[case] multiplier: f64) {
        let mut clipper = IqrClipper::with_multiplier(multiplier);
        let err = clipper.fit(&frame(array![1.0, 2.0, 3.0]), &["x"]).unwrap_err();
        assert!(matches!(err, ClipError::InvalidMultiplier(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(!clipper.is_fitted());
    }

    #[test]
    fn zero_multiplier_is_allowed() {
        let mut clipper = IqrClipper::with_multiplier(0.0);
        clipper.fit(&frame(array![1.0, 2.0, 3.0, 4.0, 5.0]), &["x"]).unwrap();
        assert_eq!(clipper.fence("x"), Some(Fence { lower: 2.0, upper: 4.0 }));
    }

    #[test]
    fn repeated_column_gets_one_fence() {
        let f = frame(array![1.0, 2.0, 3.0, 4.0, 5.0, 100.0]);
        let mut clipper = IqrClipper::new();
        clipper.fit(&f, &["x", "x"]).unwrap();
        assert_eq!(clipper.fences().map(<[_]>::len), Some(1));

        let out = clipper.transform(&f).unwrap();
        assert_eq!(out.numeric("x").unwrap(), array![1.0, 2.0, 3.0, 4.0, 5.0, 3.5].view());
    }

    #[test]
    fn unconfigured_columns_pass_through() {
        let f = Frame::from_columns([
            ("x", Column::Numeric(array![1.0, 2.0, 3.0, 4.0, 5.0, 100.0])),
            ("y", Column::Numeric(array![1.0, 2.0, 3.0, 4.0, 5.0, 100.0])),
        ])
        .unwrap();
        let mut clipper = IqrClipper::new();
        let out = clipper.fit_transform(&f, &["x"]).unwrap();
        assert_eq!(out.numeric("y"), f.numeric("y"));
    }
}
