//! Defines [`BinaryTree`], the flat tree of the classic tree builder.
use serde::{Serialize, Deserialize};

use crate::error::{Result, TreeError};
use super::Node;


/// A prediction together with the class probabilities
/// of the leaf that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityPrediction {
    /// The predicted class label.
    pub prediction: f64,
    /// `(target name, probability)` pairs in target name order.
    pub probabilities: Vec<(f64, f64)>,
}


impl ProbabilityPrediction {
    /// Returns the probability of `target_name`, if the tree knows it.
    pub fn probability(&self, target_name: f64) -> Option<f64> {
        self.probabilities.iter()
            .find(|(name, _)| *name == target_name)
            .map(|(_, p)| *p)
    }
}


/// A binary tree stored as a flat list of [`Node`]s.
/// The root is `nodes[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryTree {
    nodes: Vec<Node>,
    probabilities: Vec<Vec<f64>>,
    target_names: Vec<f64>,
}


impl BinaryTree {
    /// Construct a new `BinaryTree`.
    ///
    /// Every child index must address a node of `nodes`
    /// placed after its parent,
    /// and every leaf probability index must address
    /// a vector of `probabilities` with one entry per target name.
    /// For regression trees,
    /// `probabilities` and `target_names` are empty.
    pub fn new(
        nodes: Vec<Node>,
        probabilities: Vec<Vec<f64>>,
        target_names: Vec<f64>,
    ) -> Result<Self>
    {
        if nodes.is_empty() {
            return Err(TreeError::EmptySample);
        }

        let n_node = nodes.len();
        for (i, node) in nodes.iter().enumerate() {
            if node.is_leaf() {
                let Some(p) = node.leaf_probability_index else { continue; };
                match probabilities.get(p) {
                    Some(probs) => {
                        if probs.len() != target_names.len() {
                            return Err(TreeError::LengthMismatch {
                                what: "leaf probabilities",
                                expected: target_names.len(),
                                got: probs.len(),
                            });
                        }
                    },
                    None => {
                        return Err(TreeError::DegenerateTree {
                            node: i, index: p,
                        });
                    },
                }
                continue;
            }

            for child in [node.left_index, node.right_index] {
                match child {
                    Some(c) if c > i && c < n_node => {},
                    Some(c) => {
                        return Err(TreeError::DegenerateTree {
                            node: i, index: c,
                        });
                    },
                    None => {
                        return Err(TreeError::DegenerateTree {
                            node: i, index: usize::MAX,
                        });
                    },
                }
            }
        }

        Ok(Self { nodes, probabilities, target_names })
    }


    /// Returns the nodes of this tree.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }


    /// Returns the class labels of this tree.
    /// Empty for a regression tree.
    #[inline]
    pub fn target_names(&self) -> &[f64] {
        &self.target_names
    }


    /// Predict the value of `observation`.
    #[inline]
    pub fn predict(&self, observation: &[f64]) -> f64 {
        self.leaf(observation).value
    }


    /// Predict the class of `observation`
    /// together with the class probabilities of the reached leaf.
    pub fn predict_probability(&self, observation: &[f64])
        -> ProbabilityPrediction
    {
        let leaf = self.leaf(observation);
        let probabilities = match leaf.leaf_probability_index {
            Some(p) => self.target_names.iter()
                .copied()
                .zip(self.probabilities[p].iter().copied())
                .collect(),
            None => Vec::new(),
        };

        ProbabilityPrediction {
            prediction: leaf.value,
            probabilities,
        }
    }


    /// Returns the leaf `observation` falls into.
    /// `observation[feature] <= threshold` goes left.
    fn leaf(&self, observation: &[f64]) -> &Node {
        let mut node = &self.nodes[0];
        // Child indices were checked in `new`.
        while let Some(feature) = node.feature_index {
            let next = if observation[feature] <= node.value {
                node.left_index
            } else {
                node.right_index
            };
            match next {
                Some(i) => { node = &self.nodes[i]; },
                None => break,
            }
        }
        node
    }
}
