//! Request records and their normalization into feature rows.
//!
//! # Overview
//!
//! - [`PatientRecord`]: the typed request record
//! - [`Category`]: enumerated fields and their scalar codes
//! - [`normalize`] / [`normalize_json`]: record → [`FeatureRow`]
//!
//! Field order of a normalized row is [`FIELD_NAMES`], independent of the
//! key order of the incoming JSON.

mod category;
mod integral;
mod normalize;
mod record;
mod row;

pub use category::{
    Category, CategoryCode, Education, EmploymentStatus, Ethnicity, Flag, Gender, IncomeLevel,
    SmokingStatus, UnknownCode,
};
pub use normalize::{normalize, normalize_json, normalize_value, ValidationError};
pub use record::{PatientRecord, FIELD_NAMES, NUMERIC_FIELDS};
pub use row::{FeatureRow, FeatureValue, Field};
