//! CART decision-tree trainer (Gini impurity).
//!
//! Split search evaluates every feature in parallel and reduces the
//! per-feature winners deterministically: highest gain first, then lowest
//! feature index, then lowest threshold.

use bon::Builder;
use ndarray::{ArrayView1, ArrayView2};
use rayon::prelude::*;

use super::{check_training_data, TrainError};
use crate::repr::{DecisionTree, NodeId, TreeBuilder};

/// Gains at or below this are not worth a split.
const MIN_GAIN: f64 = 1e-12;

/// Parameters for [`TreeTrainer`].
#[derive(Clone, Debug, Builder)]
pub struct TreeParams {
    /// Maximum depth; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node (default: 2).
    #[builder(default = 2)]
    pub min_samples_split: usize,
    /// Minimum samples in each child (default: 1).
    #[builder(default = 1)]
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl Split {
    fn better(self, other: Self) -> Self {
        let other_wins = other.gain > self.gain
            || (other.gain == self.gain
                && (other.feature < self.feature
                    || (other.feature == self.feature && other.threshold < self.threshold)));
        if other_wins {
            other
        } else {
            self
        }
    }
}

/// Gini impurity of a node with `n_pos` positives out of `n`.
#[inline]
fn gini(n_pos: f64, n: f64) -> f64 {
    if n == 0.0 {
        return 0.0;
    }
    let p = n_pos / n;
    2.0 * p * (1.0 - p)
}

/// Trains a [`DecisionTree`].
#[derive(Clone, Debug, Default)]
pub struct TreeTrainer {
    params: TreeParams,
}

impl TreeTrainer {
    pub fn new(params: TreeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// Grow a tree on `x` (`[n_samples, n_features]`) and 0/1 targets `y`.
    pub fn train(&self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<DecisionTree, TrainError> {
        check_training_data(x, y)?;
        if self.params.min_samples_split < 2 {
            return Err(TrainError::InvalidParams(format!(
                "min_samples_split must be at least 2, got {}",
                self.params.min_samples_split
            )));
        }
        if self.params.min_samples_leaf == 0 {
            return Err(TrainError::InvalidParams("min_samples_leaf must be at least 1".into()));
        }

        let mut builder = TreeBuilder::new(x.ncols());
        self.grow(x, y, (0..x.nrows()).collect(), 0, &mut builder);
        let tree = builder.build()?;
        tracing::debug!(
            n_nodes = tree.n_nodes(),
            n_leaves = tree.n_leaves(),
            depth = tree.depth(),
            "trained decision tree"
        );
        Ok(tree)
    }

    fn grow(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        indices: Vec<usize>,
        depth: usize,
        builder: &mut TreeBuilder,
    ) -> NodeId {
        let n = indices.len() as f64;
        let n_pos: f64 = indices.iter().map(|&i| y[i]).sum();
        let value = n_pos / n;

        let at_max_depth = self.params.max_depth.is_some_and(|max| depth >= max);
        let pure = n_pos == 0.0 || n_pos == n;
        if at_max_depth || pure || indices.len() < self.params.min_samples_split {
            return builder.push_leaf(value);
        }

        let Some(split) = self.best_split(x, y, &indices, n_pos) else {
            return builder.push_leaf(value);
        };

        let node = builder.push_split(split.feature as u32, split.threshold);
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[[i, split.feature]] <= split.threshold);
        let left = self.grow(x, y, left, depth + 1, builder);
        let right = self.grow(x, y, right, depth + 1, builder);
        builder.set_children(node, left, right);
        node
    }

    fn best_split(
        &self,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        indices: &[usize],
        n_pos: f64,
    ) -> Option<Split> {
        let parent = gini(n_pos, indices.len() as f64);
        (0..x.ncols())
            .into_par_iter()
            .filter_map(|feature| self.best_split_for_feature(x.column(feature), y, indices, parent, feature))
            .reduce_with(Split::better)
    }

    fn best_split_for_feature(
        &self,
        column: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        indices: &[usize],
        parent: f64,
        feature: usize,
    ) -> Option<Split> {
        let mut pairs: Vec<(f64, f64)> = indices.iter().map(|&i| (column[i], y[i])).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = pairs.len();
        let total_pos: f64 = pairs.iter().map(|p| p.1).sum();
        let min_leaf = self.params.min_samples_leaf;
        let mut left_pos = 0.0;
        let mut best: Option<Split> = None;

        for k in 0..n - 1 {
            left_pos += pairs[k].1;
            let (lo, hi) = (pairs[k].0, pairs[k + 1].0);
            if lo == hi || hi.is_nan() {
                continue;
            }
            let n_left = k + 1;
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let impurity = (n_left as f64 * gini(left_pos, n_left as f64)
                + n_right as f64 * gini(total_pos - left_pos, n_right as f64))
                / n as f64;
            let gain = parent - impurity;
            if gain <= MIN_GAIN || best.is_some_and(|b| gain <= b.gain) {
                continue;
            }

            let mut threshold = lo + (hi - lo) / 2.0;
            if threshold >= hi {
                threshold = lo;
            }
            best = Some(Split {
                feature,
                threshold,
                gain,
            });
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::Classifier;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn gini_bounds() {
        assert_eq!(gini(0.0, 4.0), 0.0);
        assert_eq!(gini(4.0, 4.0), 0.0);
        assert_abs_diff_eq!(gini(2.0, 4.0), 0.5);
    }

    #[test]
    fn learns_single_threshold() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let tree = TreeTrainer::default().train(x.view(), y.view()).unwrap();

        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.threshold(0), 6.5);
        assert_eq!(tree.predict(x.view()), array![0u8, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn picks_informative_feature() {
        let x = array![[5.0, 0.0], [1.0, 0.0], [4.0, 1.0], [2.0, 1.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let tree = TreeTrainer::default().train(x.view(), y.view()).unwrap();
        assert_eq!(tree.split_feature(0), 1);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn max_depth_limits_growth() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![0.0, 1.0, 1.0, 0.0];
        let params = TreeParams::builder().max_depth(1).build();
        let stump = TreeTrainer::new(params).train(x.view(), y.view()).unwrap();
        assert_eq!(stump.depth(), 1);
        assert_eq!(stump.threshold(0), 1.5);
        assert_eq!(stump.predict(x.view()), array![0u8, 1, 1, 1]);

        let full = TreeTrainer::default().train(x.view(), y.view()).unwrap();
        assert_eq!(full.depth(), 2);
        assert_eq!(full.predict(x.view()), array![0u8, 1, 1, 0]);
    }

    #[test]
    fn pure_targets_give_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 1.0, 1.0];
        let tree = TreeTrainer::default().train(x.view(), y.view()).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.leaf_value(0), 1.0);
    }

    #[test]
    fn min_samples_leaf_is_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![1.0, 0.0, 0.0, 0.0];
        let params = TreeParams::builder().min_samples_leaf(2).build();
        let tree = TreeTrainer::new(params).train(x.view(), y.view()).unwrap();
        assert_eq!(tree.threshold(0), 2.5);
    }

    #[test]
    fn split_ordering_is_deterministic() {
        let a = Split { feature: 2, threshold: 1.0, gain: 0.5 };
        let b = Split { feature: 1, threshold: 3.0, gain: 0.5 };
        let c = Split { feature: 0, threshold: 0.0, gain: 0.4 };
        assert_eq!(a.better(b), b);
        assert_eq!(b.better(a), b);
        assert_eq!(c.better(a), a);
    }
}
