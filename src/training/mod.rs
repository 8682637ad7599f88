//! Training for the two classifier families.
//!
//! - [`LogisticTrainer`]: L2-regularized logistic regression
//! - [`TreeTrainer`]: CART decision tree (Gini)
//!
//! Both take the dense matrix produced by the one-hot encoder and 0/1
//! targets.

mod logistic;
mod metrics;
mod tree;

use ndarray::{ArrayView1, ArrayView2};
use thiserror::Error;

use crate::repr::ReprValidationError;

pub use logistic::{LogisticParams, LogisticTrainer};
pub use metrics::{Accuracy, Confusion, LogLoss, Metric};
pub use tree::{TreeParams, TreeTrainer};

/// Errors raised while fitting a classifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainError {
    #[error("training data is empty")]
    EmptyDataset,

    #[error("{rows} training rows but {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("target {index} is {value}, expected 0 or 1")]
    InvalidTarget { index: usize, value: f64 },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("trained model is malformed: {0}")]
    Repr(#[from] ReprValidationError),
}

/// Reject empty data, mismatched lengths and non-binary targets.
pub(crate) fn check_training_data(x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<(), TrainError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(TrainError::EmptyDataset);
    }
    if x.nrows() != y.len() {
        return Err(TrainError::LengthMismatch {
            rows: x.nrows(),
            targets: y.len(),
        });
    }
    if let Some((index, &value)) = y.iter().enumerate().find(|(_, &v)| v != 0.0 && v != 1.0) {
        return Err(TrainError::InvalidTarget { index, value });
    }
    Ok(())
}
