//! Preprocessing stages fitted ahead of the classifier.
//!
//! - [`IqrClipper`]: replaces outliers outside the IQR fence by the median
//! - [`OneHotEncoder`]: expands categorical columns into indicators
//!
//! Both follow the same contract: `fit` once on training data, then
//! `transform` any number of frames without mutating the stage or the input.

mod clipper;
mod encoder;
pub mod stats;

pub use clipper::{is_valid_multiplier, ClipError, Fence, IqrClipper, DEFAULT_MULTIPLIER};
pub use encoder::{CategoricalColumn, EncodeError, OneHotEncoder};
