//! Classifier representations.
//!
//! - [`LinearClassifier`]: logistic regression (weights + bias)
//! - [`DecisionTree`]: CART tree in SoA layout
//!
//! Both implement [`Classifier`] and consume the dense rows produced by the
//! one-hot encoder.

mod linear;
mod tree;

use ndarray::{Array1, ArrayView1, ArrayView2};
use thiserror::Error;

pub use linear::{sigmoid, LinearClassifier};
pub use tree::{DecisionTree, NodeId, TreeArrays, TreeBuilder};

/// Read-only binary classifier over dense `f64` rows.
pub trait Classifier {
    /// Width of the rows the classifier expects.
    fn n_features(&self) -> usize;

    /// Probability of class 1 for one row.
    fn predict_proba_row(&self, x: ArrayView1<'_, f64>) -> f64;

    /// Class (0 or 1) for one row.
    fn predict_row(&self, x: ArrayView1<'_, f64>) -> u8;

    /// Classes for every row of `x` (`[n_rows, n_features]`).
    fn predict(&self, x: ArrayView2<'_, f64>) -> Array1<u8> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }
}

/// Structural problems found when validating a classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReprValidationError {
    #[error("tree has no nodes")]
    EmptyTree,

    #[error("`{field}` has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("node {node}: {side} child {child} out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },

    #[error("node {node} references itself")]
    SelfLoop { node: NodeId },

    #[error("node {node} reached more than once")]
    DuplicateVisit { node: NodeId },

    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },

    #[error("node {node}: split feature {feature} out of bounds ({n_features} features)")]
    FeatureOutOfBounds {
        node: NodeId,
        feature: u32,
        n_features: usize,
    },

    #[error("weight {index} is not finite")]
    NonFiniteWeight { index: usize },
}
