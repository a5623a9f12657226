//! Value objects exchanged while a [`GBMDecisionTreeLearner`] grows a tree.
//!
//! [`GBMDecisionTreeLearner`]: super::GBMDecisionTreeLearner
use fixedbitset::FixedBitSet;
use serde::{Serialize, Deserialize};

use super::GBMNode;


/// Running split statistics of the residuals on one side of a split.
/// The cost is the residual sum of squares around the mean,
/// `Σr² - (Σr)² / n`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GBMSplitInfo {
    /// Number of rows on this side.
    pub samples: usize,
    /// Sum of the residuals.
    pub sum: f64,
    /// Sum of the squared residuals.
    pub sum_of_squares: f64,
    /// Residual sum of squares around the mean.
    pub cost: f64,
    /// Constant fitted to this side.
    pub best_constant: f64,
    /// Sum of the `σ(1 - σ)` terms of the rows on this side.
    /// Only [`BinomialLoss`](super::BinomialLoss) tracks it.
    pub binomial_sum: f64,
}


impl GBMSplitInfo {
    /// Construct an empty `GBMSplitInfo`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }


    /// Accumulate the residuals of the rows in `in_sample`.
    pub fn from_residuals(residuals: &[f64], in_sample: &FixedBitSet)
        -> Self
    {
        let mut info = Self::new();
        for i in in_sample.ones() {
            let r = residuals[i];
            info.samples += 1;
            info.sum += r;
            info.sum_of_squares += r * r;
        }
        info.refresh();
        info
    }


    /// Move one residual into this side.
    #[inline(always)]
    pub fn add(&mut self, residual: f64) {
        self.samples += 1;
        self.sum += residual;
        self.sum_of_squares += residual * residual;
        self.refresh();
    }


    /// Move one residual out of this side.
    #[inline(always)]
    pub fn remove(&mut self, residual: f64) {
        self.samples = self.samples.saturating_sub(1);
        self.sum -= residual;
        self.sum_of_squares -= residual * residual;
        self.refresh();
    }


    #[inline(always)]
    fn refresh(&mut self) {
        if self.samples == 0 {
            self.cost = 0f64;
            self.best_constant = 0f64;
            return;
        }
        let n = self.samples as f64;
        self.cost = self.sum_of_squares - self.sum * self.sum / n;
        self.best_constant = self.sum / n;
    }
}


/// Which child of its parent a node is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The child taking `value < threshold`.
    Left,
    /// The child taking `value >= threshold`.
    Right,
}


/// The best split found for one feature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GBMSplit {
    /// Depth of the node being split.
    pub depth: usize,
    /// Feature the split is on.
    pub feature_index: usize,
    /// Position in the feature's presorted order
    /// of the first row going right.
    pub split_index: usize,
    /// Midpoint of the two neighboring distinct values.
    pub threshold: f64,
    /// Cost of the left side.
    pub left_error: f64,
    /// Cost of the right side.
    pub right_error: f64,
    /// `left_error + right_error`.
    pub cost: f64,
    /// Parent cost minus `cost`.
    pub cost_improvement: f64,
    /// Constant fitted to the left side.
    pub left_constant: f64,
    /// Constant fitted to the right side.
    pub right_constant: f64,
    /// Number of rows in the node being split.
    pub sample_count: usize,
}


impl GBMSplit {
    /// Convert this split into a node without children.
    #[inline]
    pub fn to_node(&self) -> GBMNode {
        GBMNode {
            feature_index: Some(self.feature_index),
            threshold: self.threshold,
            left_constant: self.left_constant,
            right_constant: self.right_constant,
            left_error: self.left_error,
            right_error: self.right_error,
            sample_count: self.sample_count,
            left_index: None,
            right_index: None,
            depth: self.depth,
        }
    }
}


/// A split candidate together with the statistics of both sides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GBMSplitResult {
    /// The split.
    pub best_split: GBMSplit,
    /// Statistics of the rows going left.
    pub left: GBMSplitInfo,
    /// Statistics of the rows going right.
    pub right: GBMSplitInfo,
}


/// A node waiting in the breadth-first queue.
#[derive(Clone, Debug)]
pub struct GBMTreeCreationItem {
    /// Statistics inherited from the parent's split.
    pub values: GBMSplitInfo,
    /// Rows belonging to this node.
    pub in_sample: FixedBitSet,
    /// Depth of this node. The root has depth `1`.
    pub depth: usize,
    /// Index of the parent node and the side this node hangs on.
    /// `None` for the root.
    pub parent: Option<(usize, Side)>,
}
