//! Tabular data handling.
//!
//! - [`Frame`]: named columns, each either numeric or categorical
//! - [`read_labeled_records`]: load a training CSV into typed records

mod csv;
mod frame;

pub use self::csv::{read_labeled_from, read_labeled_records, CsvError, LabeledRecords};
pub use frame::{Column, Frame, FrameError};
