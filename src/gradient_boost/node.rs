//! Defines [`GBMNode`] and [`GBMTree`], the regression tree
//! grown at each boosting iteration.
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::error::{Result, TreeError};
use crate::common::checker;
use crate::F64Matrix;


/// A split node of a [`GBMTree`].
///
/// Each side either continues at a child node
/// or ends with a fitted constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GBMNode {
    /// Feature this node splits on. `None` for the root constant holder.
    pub feature_index: Option<usize>,
    /// Rows with `observation[feature] < threshold` go left.
    pub threshold: f64,
    /// Constant predicted when the left child is unset.
    pub left_constant: f64,
    /// Constant predicted when the right child is unset.
    pub right_constant: f64,
    /// Cost of the left side.
    pub left_error: f64,
    /// Cost of the right side.
    pub right_error: f64,
    /// Number of rows that reached this node during training.
    pub sample_count: usize,
    /// Index of the left child.
    pub left_index: Option<usize>,
    /// Index of the right child.
    pub right_index: Option<usize>,
    /// Depth of this node. The root has depth `1`.
    pub depth: usize,
}


impl GBMNode {
    /// Construct the node holding the root constant.
    /// It has no feature and no children.
    #[inline]
    pub fn root(constant: f64, cost: f64, sample_count: usize) -> Self {
        Self {
            feature_index: None,
            threshold: 0f64,
            left_constant: constant,
            right_constant: constant,
            left_error: cost,
            right_error: cost,
            sample_count,
            left_index: None,
            right_index: None,
            depth: 0,
        }
    }
}


/// A regression tree stored as a flat list of [`GBMNode`]s.
///
/// `nodes[0]` holds the constant fitted to the whole sample.
/// If the tree has any split, the first split is `nodes[1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GBMTree {
    nodes: Vec<GBMNode>,
}


impl GBMTree {
    /// Construct a new `GBMTree` from its nodes.
    ///
    /// Every node after the first must split on a feature,
    /// and every child index must address a split node
    /// placed after its parent.
    pub fn new(nodes: Vec<GBMNode>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(TreeError::EmptySample);
        }

        let n_node = nodes.len();
        for (i, node) in nodes.iter().enumerate().skip(1) {
            if node.feature_index.is_none() {
                return Err(TreeError::DegenerateTree { node: i, index: i });
            }
            for child in [node.left_index, node.right_index].into_iter().flatten() {
                if child <= i || child >= n_node {
                    return Err(TreeError::DegenerateTree {
                        node: i, index: child,
                    });
                }
            }
        }

        Ok(Self { nodes })
    }


    /// Returns the nodes of this tree.
    #[inline]
    pub fn nodes(&self) -> &[GBMNode] {
        &self.nodes
    }


    /// Returns `true` if this tree has no split.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.nodes.len() == 1
    }


    /// Predict the value of `observation`.
    pub fn predict(&self, observation: &[f64]) -> f64 {
        if self.is_constant() {
            return self.nodes[0].left_constant;
        }

        let mut index = 1;
        loop {
            let node = &self.nodes[index];
            // Every node after the root has a feature, see `new`.
            let feature = match node.feature_index {
                Some(feature) => feature,
                None => return node.left_constant,
            };

            let (child, constant) = if observation[feature] < node.threshold {
                (node.left_index, node.left_constant)
            } else {
                (node.right_index, node.right_constant)
            };

            match child {
                Some(next) => { index = next; },
                None => return constant,
            }
        }
    }


    /// Predict every row of `observations`.
    pub fn predict_all(&self, observations: &F64Matrix) -> Vec<f64> {
        let mut predictions = vec![0f64; observations.row_count()];
        self.fill(observations, &mut predictions);
        predictions
    }


    /// Predict every row of `observations` into `predictions`.
    pub fn predict_into(
        &self,
        observations: &F64Matrix,
        predictions: &mut [f64],
    ) -> Result<()>
    {
        checker::length(
            "predictions", observations.row_count(), predictions.len()
        )?;
        self.fill(observations, predictions);
        Ok(())
    }


    fn fill(&self, observations: &F64Matrix, predictions: &mut [f64]) {
        predictions.par_iter_mut()
            .enumerate()
            .for_each(|(i, p)| {
                *p = self.predict(observations.row(i));
            });
    }
}
