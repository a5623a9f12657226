//! Gradient boosting with regression trees grown on presorted features.
//!
//! [`GBM`] owns the boosting loop.
//! At each iteration it asks the [`GradientBoostLoss`] for the residuals
//! and fits one [`GBMTree`] to them with [`GBMDecisionTreeLearner`].
//! [`GBMClassifier`] runs the same loop once per class
//! with the [`BinomialLoss`].

pub mod split;
pub mod node;
pub mod loss;
pub mod builder;
pub mod learner;
pub mod gbm;
pub mod classifier;
pub mod model;

pub use split::{
    GBMSplitInfo,
    GBMSplit,
    GBMSplitResult,
    GBMTreeCreationItem,
    Side,
};
pub use node::{GBMNode, GBMTree};
pub use loss::{
    GradientBoostLoss,
    SquaredLoss,
    AbsoluteLoss,
    QuantileLoss,
    HuberLoss,
    BinomialLoss,
};
pub use builder::GBMDecisionTreeLearnerBuilder;
pub use learner::GBMDecisionTreeLearner;
pub use gbm::GBM;
pub use classifier::GBMClassifier;
pub use model::{GradientBoostModel, ClassificationGradientBoostModel};
