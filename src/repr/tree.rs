//! Decision-tree classifier (SoA layout).
//!
//! Node arrays are indexed by [`NodeId`]; node 0 is the root. For split nodes
//! `x[split_feature] <= threshold` goes left. Leaves store the fraction of
//! positive training samples that reached them.

use ndarray::ArrayView1;

use super::{Classifier, ReprValidationError};

/// Node index.
pub type NodeId = u32;

/// Immutable binary decision tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    n_features: usize,
    split_features: Vec<u32>,
    thresholds: Vec<f64>,
    left_children: Vec<NodeId>,
    right_children: Vec<NodeId>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f64>,
}

/// Raw node arrays of a [`DecisionTree`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeArrays {
    pub n_features: usize,
    pub split_features: Vec<u32>,
    pub thresholds: Vec<f64>,
    pub left_children: Vec<NodeId>,
    pub right_children: Vec<NodeId>,
    pub is_leaf: Vec<bool>,
    pub leaf_values: Vec<f64>,
}

impl DecisionTree {
    /// Build a tree from raw arrays, validating the structure.
    pub fn from_arrays(arrays: TreeArrays) -> Result<Self, ReprValidationError> {
        let tree = Self {
            n_features: arrays.n_features,
            split_features: arrays.split_features,
            thresholds: arrays.thresholds,
            left_children: arrays.left_children,
            right_children: arrays.right_children,
            is_leaf: arrays.is_leaf,
            leaf_values: arrays.leaf_values,
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Copy of the raw node arrays.
    pub fn to_arrays(&self) -> TreeArrays {
        TreeArrays {
            n_features: self.n_features,
            split_features: self.split_features.clone(),
            thresholds: self.thresholds.clone(),
            left_children: self.left_children.clone(),
            right_children: self.right_children.clone(),
            is_leaf: self.is_leaf.clone(),
            leaf_values: self.leaf_values.clone(),
        }
    }

    /// Number of nodes (internal + leaves).
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    /// Length of the longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if self.is_leaf(node) {
                max_depth = max_depth.max(depth);
            } else {
                stack.push((self.left_child(node), depth + 1));
                stack.push((self.right_child(node), depth + 1));
            }
        }
        max_depth
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_feature(&self, node: NodeId) -> u32 {
        self.split_features[node as usize]
    }

    #[inline]
    pub fn threshold(&self, node: NodeId) -> f64 {
        self.thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f64 {
        self.leaf_values[node as usize]
    }

    /// Walk from the root to the leaf reached by `x`.
    ///
    /// NaN features go right.
    pub fn traverse_to_leaf(&self, x: ArrayView1<'_, f64>) -> NodeId {
        let mut node = 0;
        while !self.is_leaf(node) {
            let value = x[self.split_feature(node) as usize];
            node = if value <= self.threshold(node) {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }
        node
    }

    /// Check array lengths, child bounds and that every node is reached
    /// exactly once from the root.
    pub fn validate(&self) -> Result<(), ReprValidationError> {
        let n_nodes = self.is_leaf.len();
        if n_nodes == 0 {
            return Err(ReprValidationError::EmptyTree);
        }
        for (field, len) in [
            ("split_features", self.split_features.len()),
            ("thresholds", self.thresholds.len()),
            ("left_children", self.left_children.len()),
            ("right_children", self.right_children.len()),
            ("leaf_values", self.leaf_values.len()),
        ] {
            if len != n_nodes {
                return Err(ReprValidationError::LengthMismatch {
                    field,
                    expected: n_nodes,
                    actual: len,
                });
            }
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];
        while let Some(node) = stack.pop() {
            let idx = node as usize;
            if visited[idx] {
                return Err(ReprValidationError::DuplicateVisit { node });
            }
            visited[idx] = true;
            if self.is_leaf[idx] {
                continue;
            }
            let feature = self.split_features[idx];
            if feature as usize >= self.n_features {
                return Err(ReprValidationError::FeatureOutOfBounds {
                    node,
                    feature,
                    n_features: self.n_features,
                });
            }
            for (side, child) in [("left", self.left_children[idx]), ("right", self.right_children[idx])] {
                if child as usize >= n_nodes {
                    return Err(ReprValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                if child == node {
                    return Err(ReprValidationError::SelfLoop { node });
                }
                stack.push(child);
            }
        }

        if let Some(node) = visited.iter().position(|&v| !v) {
            return Err(ReprValidationError::UnreachableNode { node: node as NodeId });
        }
        Ok(())
    }
}

impl Classifier for DecisionTree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba_row(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.leaf_value(self.traverse_to_leaf(x))
    }

    fn predict_row(&self, x: ArrayView1<'_, f64>) -> u8 {
        u8::from(self.predict_proba_row(x) > 0.5)
    }
}

/// Mutable tree under construction.
///
/// Nodes are appended; split nodes get their children wired once the
/// children exist.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    arrays: TreeArrays,
}

impl TreeBuilder {
    /// Empty builder for a tree over `n_features` inputs.
    pub fn new(n_features: usize) -> Self {
        Self {
            arrays: TreeArrays {
                n_features,
                ..Default::default()
            },
        }
    }

    /// Append a leaf node.
    pub fn push_leaf(&mut self, value: f64) -> NodeId {
        self.push(0, 0.0, true, value)
    }

    /// Append a split node with unwired children.
    pub fn push_split(&mut self, feature: u32, threshold: f64) -> NodeId {
        self.push(feature, threshold, false, 0.0)
    }

    /// Wire the children of a split node.
    pub fn set_children(&mut self, node: NodeId, left: NodeId, right: NodeId) {
        self.arrays.left_children[node as usize] = left;
        self.arrays.right_children[node as usize] = right;
    }

    /// Number of nodes so far.
    pub fn n_nodes(&self) -> usize {
        self.arrays.is_leaf.len()
    }

    /// Freeze and validate.
    pub fn build(self) -> Result<DecisionTree, ReprValidationError> {
        DecisionTree::from_arrays(self.arrays)
    }

    fn push(&mut self, feature: u32, threshold: f64, leaf: bool, value: f64) -> NodeId {
        let id = self.arrays.is_leaf.len() as NodeId;
        self.arrays.split_features.push(feature);
        self.arrays.thresholds.push(threshold);
        self.arrays.left_children.push(0);
        self.arrays.right_children.push(0);
        self.arrays.is_leaf.push(leaf);
        self.arrays.leaf_values.push(value);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// x0 <= 0.5 ? 0.1 : (x1 <= 2.0 ? 0.4 : 0.9)
    fn stump() -> DecisionTree {
        let mut b = TreeBuilder::new(2);
        let root = b.push_split(0, 0.5);
        let left = b.push_leaf(0.1);
        let right = b.push_split(1, 2.0);
        let rl = b.push_leaf(0.4);
        let rr = b.push_leaf(0.9);
        b.set_children(root, left, right);
        b.set_children(right, rl, rr);
        b.build().unwrap()
    }

    #[test]
    fn traversal_follows_thresholds() {
        let tree = stump();
        assert_eq!(tree.predict_proba_row(array![0.5, 9.0].view()), 0.1);
        assert_eq!(tree.predict_proba_row(array![1.0, 2.0].view()), 0.4);
        assert_eq!(tree.predict_proba_row(array![1.0, 3.0].view()), 0.9);
        assert_eq!(tree.predict_row(array![1.0, 3.0].view()), 1);
        assert_eq!(tree.predict_row(array![1.0, 2.0].view()), 0);
    }

    #[test]
    fn shape_queries() {
        let tree = stump();
        assert_eq!(tree.n_nodes(), 5);
        assert_eq!(tree.n_leaves(), 3);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn validate_rejects_out_of_bounds_child() {
        let mut arrays = stump().to_arrays();
        arrays.left_children[0] = 99;
        assert!(matches!(
            DecisionTree::from_arrays(arrays),
            Err(ReprValidationError::ChildOutOfBounds { node: 0, child: 99, .. })
        ));
    }

    #[test]
    fn validate_rejects_unreachable_node() {
        let mut arrays = stump().to_arrays();
        arrays.right_children[0] = 3;
        arrays.is_leaf[3] = true;
        assert!(DecisionTree::from_arrays(arrays).is_err());
    }

    #[test]
    fn validate_rejects_feature_out_of_bounds() {
        let mut arrays = stump().to_arrays();
        arrays.n_features = 1;
        assert!(matches!(
            DecisionTree::from_arrays(arrays),
            Err(ReprValidationError::FeatureOutOfBounds { feature: 1, .. })
        ));
    }

    #[test]
    fn single_leaf_tree() {
        let mut b = TreeBuilder::new(3);
        b.push_leaf(0.7);
        let tree = b.build().unwrap();
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_row(array![0.0, 0.0, 0.0].view()), 1);
    }
}
