//! Defines [`GBMDecisionTreeLearnerBuilder`].
use rand::{SeedableRng, rngs::StdRng};

use crate::error::{Result, TreeError};
use super::{GradientBoostLoss, GBMDecisionTreeLearner};


/// The maximal tree depth set as default.
pub const DEFAULT_MAX_DEPTH: usize = 2000;
/// The minimum number of rows on each side of a split set as default.
pub const DEFAULT_MIN_SPLIT_SIZE: usize = 1;
/// The minimum cost improvement of an expanded node set as default.
pub const DEFAULT_MIN_INFORMATION_GAIN: f64 = 1e-6;
/// The number of features searched per split set as default.
/// `0` means all features.
pub const DEFAULT_FEATURES_PR_SPLIT: usize = 0;
/// The seed of the feature subsampling set as default.
pub const DEFAULT_SEED: u64 = 234;


/// A struct that builds [`GBMDecisionTreeLearner`].
///
/// # Example
///
/// ```
/// use treeboosts::prelude::*;
///
/// let learner = GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
///     .max_depth(3)
///     .min_split_size(2)
///     .features_pr_split(0)
///     .run_parallel(false)
///     .build()
///     .unwrap();
/// assert_eq!(learner.max_depth(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct GBMDecisionTreeLearnerBuilder<L> {
    loss: L,
    max_depth: usize,
    min_split_size: usize,
    min_information_gain: f64,
    features_pr_split: usize,
    run_parallel: bool,
    seed: u64,
}


impl<L> GBMDecisionTreeLearnerBuilder<L>
    where L: GradientBoostLoss,
{
    /// Construct a new instance of `GBMDecisionTreeLearnerBuilder`.
    /// By default,
    /// `GBMDecisionTreeLearnerBuilder` sets the parameters as follows;
    /// ```text
    /// max_depth: DEFAULT_MAX_DEPTH == 2000,
    /// min_split_size: DEFAULT_MIN_SPLIT_SIZE == 1,
    /// min_information_gain: DEFAULT_MIN_INFORMATION_GAIN == 1e-6,
    /// features_pr_split: DEFAULT_FEATURES_PR_SPLIT == 0 (all),
    /// run_parallel: true,
    /// seed: DEFAULT_SEED == 234,
    /// ```
    pub fn new(loss: L) -> Self {
        Self {
            loss,
            max_depth: DEFAULT_MAX_DEPTH,
            min_split_size: DEFAULT_MIN_SPLIT_SIZE,
            min_information_gain: DEFAULT_MIN_INFORMATION_GAIN,
            features_pr_split: DEFAULT_FEATURES_PR_SPLIT,
            run_parallel: true,
            seed: DEFAULT_SEED,
        }
    }


    /// Specify the maximal depth of the tree.
    /// The root has depth `1`.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }


    /// Specify the minimum number of rows on each side of a split.
    pub fn min_split_size(mut self, size: usize) -> Self {
        self.min_split_size = size;
        self
    }


    /// Specify the minimum cost improvement
    /// a node needs to get children.
    pub fn min_information_gain(mut self, gain: f64) -> Self {
        self.min_information_gain = gain;
        self
    }


    /// Specify the number of randomly chosen features
    /// searched at each node. `0` means all features.
    pub fn features_pr_split(mut self, n_features: usize) -> Self {
        self.features_pr_split = n_features;
        self
    }


    /// Search the features of a node on the rayon thread pool.
    pub fn run_parallel(mut self, run_parallel: bool) -> Self {
        self.run_parallel = run_parallel;
        self
    }


    /// Set the seed of the feature subsampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Build a [`GBMDecisionTreeLearner`].
    /// This method consumes `self`.
    pub fn build(self) -> Result<GBMDecisionTreeLearner<L>> {
        if self.max_depth == 0 {
            return Err(TreeError::InvalidMaxDepth(self.max_depth));
        }
        if self.min_split_size == 0 {
            return Err(TreeError::InvalidMinSplitSize(self.min_split_size));
        }
        let gain = self.min_information_gain;
        if gain.is_nan() || gain <= 0f64 {
            return Err(TreeError::InvalidMinInformationGain(gain));
        }

        Ok(GBMDecisionTreeLearner {
            loss: self.loss,
            max_depth: self.max_depth,
            min_split_size: self.min_split_size,
            min_information_gain: self.min_information_gain,
            features_pr_split: self.features_pr_split,
            run_parallel: self.run_parallel,
            rng: StdRng::seed_from_u64(self.seed),
        })
    }
}
