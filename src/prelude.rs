//! Exports the learners, calculators and traits of this crate.
//!
pub use crate::{
    // Errors -----------------------------------
    TreeError,


    // Data -------------------------------------
    F64Matrix,
};


pub use crate::common::{
    ordered_elements,
    median,
    score_at_percentile,
    mask_from_indices,
};


pub use crate::impurity::{
    // Calculator trait
    ImpurityCalculator,
    ChildImpurities,
    Interval1D,
    TargetCounts,


    // Classification ---------------------------
    GiniClassificationImpurityCalculator,
    EntropyClassificationImpurityCalculator,


    // Regression -------------------------------
    RegressionImpurityCalculator,
};


pub use crate::tree::{
    Node,
    BinaryTree,
    ProbabilityPrediction,
};


pub use crate::gradient_boost::{
    // Boosters and their models
    GBM,
    GradientBoostModel,
    GBMClassifier,
    ClassificationGradientBoostModel,


    // Tree learner
    GBMDecisionTreeLearner,
    GBMDecisionTreeLearnerBuilder,
    GBMTree,
    GBMNode,


    // Losses
    GradientBoostLoss,
    SquaredLoss,
    AbsoluteLoss,
    QuantileLoss,
    HuberLoss,
    BinomialLoss,
};
