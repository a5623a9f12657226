//! Defines [`GradientBoostModel`], the ensemble returned by [`GBM`],
//! and [`ClassificationGradientBoostModel`],
//! the ensemble returned by [`GBMClassifier`].
//!
//! [`GBM`]: super::GBM
//! [`GBMClassifier`]: super::GBMClassifier
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use crate::error::{Result, TreeError};
use crate::tree::ProbabilityPrediction;
use crate::F64Matrix;
use super::GBMTree;
use super::loss::sigmoid;


/// An additive ensemble of [`GBMTree`]s.
///
/// The prediction of an observation `x` is
/// `initial_loss + learning_rate * Σ_t tree_t(x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostModel {
    trees: Vec<GBMTree>,
    learning_rate: f64,
    initial_loss: f64,
    feature_count: usize,
}


impl GradientBoostModel {
    /// Construct a new instance of `GradientBoostModel`.
    pub fn new(
        trees: Vec<GBMTree>,
        learning_rate: f64,
        initial_loss: f64,
        feature_count: usize,
    ) -> Self
    {
        Self { trees, learning_rate, initial_loss, feature_count }
    }


    /// Returns the trees of this model in boosting order.
    #[inline]
    pub fn trees(&self) -> &[GBMTree] {
        &self.trees
    }


    /// Returns the shrinkage applied to every tree.
    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }


    /// Returns the constant the ensemble starts from.
    #[inline]
    pub fn initial_loss(&self) -> f64 {
        self.initial_loss
    }


    /// Returns the number of features the model was trained on.
    #[inline]
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }


    /// Predict the value of `observation`.
    pub fn predict(&self, observation: &[f64]) -> f64 {
        let sum = self.trees.iter()
            .map(|tree| tree.predict(observation))
            .sum::<f64>();
        self.initial_loss + self.learning_rate * sum
    }


    /// Predict every row of `observations`.
    pub fn predict_all(&self, observations: &F64Matrix) -> Vec<f64> {
        (0..observations.row_count()).into_par_iter()
            .map(|i| self.predict(observations.row(i)))
            .collect()
    }
}


/// One-vs-all ensembles of [`GBMTree`]s, one per scored class.
///
/// Sequence `k` scores `target_names[k]` in log-odds,
/// `initial_losses[k] + learning_rate * Σ_t trees[k][t](x)`.
/// With two classes only the first name is scored
/// and the second one gets the complement.
/// With more classes the sigmoids of the scores are
/// normalized to sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationGradientBoostModel {
    trees: Vec<Vec<GBMTree>>,
    initial_losses: Vec<f64>,
    learning_rate: f64,
    target_names: Vec<f64>,
    feature_count: usize,
}


impl ClassificationGradientBoostModel {
    /// Construct a new instance of `ClassificationGradientBoostModel`.
    ///
    /// `trees` and `initial_losses` hold one entry per scored class:
    /// one for two target names, one per name otherwise.
    pub fn new(
        trees: Vec<Vec<GBMTree>>,
        initial_losses: Vec<f64>,
        learning_rate: f64,
        target_names: Vec<f64>,
        feature_count: usize,
    ) -> Result<Self>
    {
        let n_class = target_names.len();
        if n_class < 2 {
            return Err(TreeError::TooFewClasses(n_class));
        }
        let n_scored = scored_classes(n_class);
        if trees.len() != n_scored {
            return Err(TreeError::LengthMismatch {
                what: "tree sequences", expected: n_scored, got: trees.len(),
            });
        }
        if initial_losses.len() != n_scored {
            return Err(TreeError::LengthMismatch {
                what: "initial losses",
                expected: n_scored,
                got: initial_losses.len(),
            });
        }

        Ok(Self {
            trees, initial_losses, learning_rate, target_names, feature_count,
        })
    }


    /// Returns the tree sequences, one per scored class.
    #[inline]
    pub fn trees(&self) -> &[Vec<GBMTree>] {
        &self.trees
    }


    /// Returns the log-odds each scored class starts from.
    #[inline]
    pub fn initial_losses(&self) -> &[f64] {
        &self.initial_losses
    }


    /// Returns the shrinkage applied to every tree.
    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }


    /// Returns the class labels in ascending order.
    #[inline]
    pub fn target_names(&self) -> &[f64] {
        &self.target_names
    }


    /// Returns the number of features the model was trained on.
    #[inline]
    pub fn feature_count(&self) -> usize {
        self.feature_count
    }


    /// Predict the class label of `observation`.
    pub fn predict(&self, observation: &[f64]) -> f64 {
        self.predict_probability(observation).prediction
    }


    /// Predict the class label of `observation`
    /// together with the probability of every target name.
    ///
    /// Equal probabilities go to the name listed first.
    pub fn predict_probability(&self, observation: &[f64])
        -> ProbabilityPrediction
    {
        let raw = (0..self.trees.len())
            .map(|k| self.class_probability(observation, k))
            .collect::<Vec<_>>();

        let probabilities = if self.target_names.len() == 2 {
            vec![raw[0], 1f64 - raw[0]]
        } else {
            let total = raw.iter().sum::<f64>();
            if total > 0f64 {
                raw.into_iter().map(|p| p / total).collect()
            } else {
                vec![1f64 / self.target_names.len() as f64; raw.len()]
            }
        };

        let mut best = 0;
        for (k, &p) in probabilities.iter().enumerate() {
            if p > probabilities[best] { best = k; }
        }

        ProbabilityPrediction {
            prediction: self.target_names[best],
            probabilities: self.target_names.iter()
                .copied()
                .zip(probabilities)
                .collect(),
        }
    }


    /// Predict the class label of every row of `observations`.
    pub fn predict_all(&self, observations: &F64Matrix) -> Vec<f64> {
        (0..observations.row_count()).into_par_iter()
            .map(|i| self.predict(observations.row(i)))
            .collect()
    }


    /// Predict every row of `observations` with probabilities.
    pub fn predict_probability_all(&self, observations: &F64Matrix)
        -> Vec<ProbabilityPrediction>
    {
        (0..observations.row_count()).into_par_iter()
            .map(|i| self.predict_probability(observations.row(i)))
            .collect()
    }


    /// The sigmoid of the score of scored class `k`.
    fn class_probability(&self, observation: &[f64], k: usize) -> f64 {
        let sum = self.trees[k].iter()
            .map(|tree| tree.predict(observation))
            .sum::<f64>();
        sigmoid(self.initial_losses[k] + self.learning_rate * sum)
    }
}


/// Number of tree sequences a problem with `n_class` classes needs.
#[inline(always)]
pub(super) fn scored_classes(n_class: usize) -> usize {
    if n_class == 2 { 1 } else { n_class }
}
