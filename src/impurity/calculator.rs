//! Provides the [`ImpurityCalculator`] trait.
use serde::{Serialize, Deserialize};

use crate::error::Result;
use super::Interval1D;


/// Impurities of the left/right children at the current split position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildImpurities {
    /// Impurity of the examples in `[from, position)`.
    pub left: f64,
    /// Impurity of the examples in `[position, to)`.
    pub right: f64,
}


impl ChildImpurities {
    /// Construct a new instance of `ChildImpurities`.
    #[inline]
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}


/// The trait [`ImpurityCalculator`] defines the contract
/// between a tree builder and a split scorer.
///
/// A tree builder orders the targets (and weights) of a node
/// by one feature, calls [`ImpurityCalculator::init`] over the node's
/// interval, then sweeps candidate positions in increasing order:
///
/// ```text
/// calculator.init(names, targets, weights, interval)?;
/// let parent = calculator.node_impurity();
/// for position in candidates {            // increasing
///     calculator.update_index(position)?;
///     let gain = calculator.impurity_improvement(parent);
///     ...
/// }
/// calculator.reset();                     // sweep again, no re-scan
/// ```
///
/// # Required Methods
/// - [`ImpurityCalculator::init`]
/// - [`ImpurityCalculator::update_interval`]
/// - [`ImpurityCalculator::update_index`]
/// - [`ImpurityCalculator::reset`]
/// - [`ImpurityCalculator::child_impurities`]
/// - [`ImpurityCalculator::node_impurity`]
/// - [`ImpurityCalculator::impurity_improvement`]
/// - [`ImpurityCalculator::leaf_value`]
/// - [`ImpurityCalculator::leaf_probabilities`]
/// - [`ImpurityCalculator::target_names`]
/// - [`ImpurityCalculator::weighted_left`]
/// - [`ImpurityCalculator::weighted_right`]
pub trait ImpurityCalculator<'a> {
    /// Reset every running aggregate for `interval`.
    /// `weights` may be empty, meaning a unit weight per example.
    fn init(
        &mut self,
        target_names: &[f64],
        targets: &'a [f64],
        weights: &'a [f64],
        interval: Interval1D,
    ) -> Result<()>;

    /// Re-initialize over `interval`,
    /// keeping the targets and weights of the last `init`.
    fn update_interval(&mut self, interval: Interval1D) -> Result<()>;

    /// Move the examples in `[current_position, new_position)`
    /// from the right child to the left child.
    ///
    /// Returns `Err` if `new_position` is behind the current position
    /// or past the end of the interval.
    fn update_index(&mut self, new_position: usize) -> Result<()>;

    /// Rewind the cursor to the start of the interval
    /// using the already computed totals.
    fn reset(&mut self);

    /// Returns the child impurities at the current position.
    fn child_impurities(&self) -> ChildImpurities;

    /// Returns the impurity of the whole interval.
    fn node_impurity(&self) -> f64;

    /// Returns the improvement over `impurity`
    /// obtained by splitting at the current position.
    fn impurity_improvement(&self, impurity: f64) -> f64;

    /// Returns the value of a leaf holding the whole interval.
    fn leaf_value(&self) -> f64;

    /// Returns the per-class probabilities of a leaf
    /// holding the whole interval, in `target_names` order.
    /// Empty for regression.
    fn leaf_probabilities(&self) -> Vec<f64>;

    /// Returns the class labels this calculator counts.
    /// Empty for regression.
    fn target_names(&self) -> &[f64];

    /// Weighted mass left of the cursor.
    fn weighted_left(&self) -> f64;

    /// Weighted mass right of the cursor.
    fn weighted_right(&self) -> f64;
}
