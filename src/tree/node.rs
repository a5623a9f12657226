//! Defines the node of a [`BinaryTree`](super::BinaryTree).
use serde::{Serialize, Deserialize};


/// A node of a flat binary tree.
///
/// A branch holds a feature index, a threshold in `value`,
/// and the indices of both children.
/// A leaf holds its prediction in `value`
/// and optionally the index of its class probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Feature this node splits on. `None` for a leaf.
    pub feature_index: Option<usize>,
    /// Threshold for a branch, prediction for a leaf.
    pub value: f64,
    /// Index of the child taking `observation[feature] <= value`.
    pub left_index: Option<usize>,
    /// Index of the child taking `observation[feature] > value`.
    pub right_index: Option<usize>,
    /// Position of this node in the tree.
    pub node_index: usize,
    /// Index into the tree's probability table. Leaves only.
    pub leaf_probability_index: Option<usize>,
}


impl Node {
    /// Construct a branch node.
    #[inline]
    pub fn branch(
        node_index: usize,
        feature_index: usize,
        threshold: f64,
        left_index: usize,
        right_index: usize,
    ) -> Self
    {
        Self {
            feature_index: Some(feature_index),
            value: threshold,
            left_index: Some(left_index),
            right_index: Some(right_index),
            node_index,
            leaf_probability_index: None,
        }
    }


    /// Construct a leaf node predicting `value`.
    #[inline]
    pub fn leaf(
        node_index: usize,
        value: f64,
        leaf_probability_index: Option<usize>,
    ) -> Self
    {
        Self {
            feature_index: None,
            value,
            left_index: None,
            right_index: None,
            node_index,
            leaf_probability_index,
        }
    }


    /// Returns `true` if this node has no split.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.feature_index.is_none()
    }
}
