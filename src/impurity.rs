//! Incremental impurity calculators used to score candidate splits.
//!
//! A calculator is initialized over an interval `[from, to)` of targets
//! that a tree builder has already ordered by one feature.
//! The builder then sweeps a cursor forward with
//! [`ImpurityCalculator::update_index`],
//! moving examples from the right child to the left child,
//! and asks for the child impurities at every candidate position.
//! Each call costs `O(#classes)` (classification)
//! or `O(1)` (regression), never `O(#examples)`.

pub mod interval;
pub mod target_counts;
pub mod calculator;
mod classification;
pub mod gini;
pub mod entropy;
pub mod regression;

pub use interval::Interval1D;
pub use target_counts::TargetCounts;
pub use calculator::{
    ImpurityCalculator,
    ChildImpurities,
};
pub use gini::GiniClassificationImpurityCalculator;
pub use entropy::EntropyClassificationImpurityCalculator;
pub use regression::RegressionImpurityCalculator;
