//! diabeto: IQR-clipped classification pipelines served over HTTP.
//!
//! A health and lifestyle record is normalized into a feature row, run
//! through a fitted pipeline (outlier clipping, one-hot encoding, logistic
//! regression or decision tree) and answered with `"Smoker"` or
//! `"Non-Smoker"`.
//!
//! # Key Types
//!
//! - [`IqrClipper`] - IQR-fence outlier clipping with median replacement
//! - [`PatientRecord`] / [`normalize`] - typed request record and its feature row
//! - [`Pipeline`] - fitted clipper, encoder and classifier, with save/load
//! - [`service::router`] - the axum router exposing both pipelines
//!
//! # Training
//!
//! Build a [`Frame`] (from CSV via [`data::read_labeled_records`]), then call
//! [`Pipeline::fit`] with a [`PipelineKind`] and a [`TrainConfig`].

pub mod data;
pub mod error;
pub mod features;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod preprocess;
pub mod repr;
pub mod service;
pub mod testing;
pub mod training;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use data::{Column, Frame};
pub use error::{Error, ErrorKind, Result};
pub use features::{normalize, normalize_json, FeatureRow, PatientRecord};
pub use pipeline::{Pipeline, PipelineKind, Prediction, TrainConfig};
pub use preprocess::{IqrClipper, OneHotEncoder};
