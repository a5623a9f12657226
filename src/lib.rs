#![warn(missing_docs)]

//!
//! A crate that provides decision tree building blocks
//! and a gradient boosting machine over presorted features.
//!
//! This crate includes two families of components.
//!
//! - Impurity calculators
//!     Stateful split scorers for classification
//!     (`GiniClassificationImpurityCalculator`,
//!     `EntropyClassificationImpurityCalculator`)
//!     and regression (`RegressionImpurityCalculator`).
//!     A tree builder sweeps a cursor over a node's examples,
//!     sorted by one feature,
//!     and the calculator keeps the left/right aggregates up to date.
//!     Trees built this way are stored as a flat `BinaryTree`.
//!
//!
//! - Gradient boosting
//!     `GBM` fits one regression tree per iteration
//!     to the negative gradient of a `GradientBoostLoss`.
//!     Each tree is grown breadth-first by `GBMDecisionTreeLearner`,
//!     which sorts every feature once per run
//!     and represents a node as a mask over the sorted rows.
//!     The features of a node are searched in parallel.
//!     `GBMClassifier` boosts one tree sequence per class label
//!     with the `BinomialLoss` and predicts class probabilities.
//!
//! ```
//! use treeboosts::prelude::*;
//!
//! let observations = F64Matrix::from_rows(&[
//!     [0.0, 1.0], [1.0, 1.0], [2.0, 0.0], [3.0, 0.0],
//! ]).unwrap();
//! let targets = [1.0, 1.0, 3.0, 3.0];
//!
//! let learner = GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
//!     .max_depth(3)
//!     .build()
//!     .unwrap();
//! let model = GBM::init(learner)
//!     .iterations(20)
//!     .learning_rate(0.5)
//!     .run(&observations, &targets)
//!     .unwrap();
//!
//! let predictions = model.predict_all(&observations);
//! assert!((predictions[0] - 1.0).abs() < 1e-3);
//! assert!((predictions[3] - 3.0).abs() < 1e-3);
//! ```

pub mod error;
pub mod matrix;
pub mod common;
pub mod impurity;
pub mod tree;
pub mod gradient_boost;
pub mod prelude;


pub use error::{Result, TreeError};
pub use matrix::F64Matrix;

pub use impurity::{
    Interval1D,
    TargetCounts,
    ImpurityCalculator,
    ChildImpurities,
    GiniClassificationImpurityCalculator,
    EntropyClassificationImpurityCalculator,
    RegressionImpurityCalculator,
};

pub use tree::{
    Node,
    BinaryTree,
    ProbabilityPrediction,
};

pub use gradient_boost::{
    GBM,
    GBMClassifier,
    GradientBoostModel,
    ClassificationGradientBoostModel,
    GBMDecisionTreeLearner,
    GBMDecisionTreeLearnerBuilder,
    GBMTree,
    GBMNode,
    GradientBoostLoss,
    SquaredLoss,
    AbsoluteLoss,
    QuantileLoss,
    HuberLoss,
    BinomialLoss,
};
