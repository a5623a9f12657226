//! Classification impurity calculator using the Gini index.
use crate::error::Result;
use super::{
    Interval1D,
    TargetCounts,
    ImpurityCalculator,
    ChildImpurities,
    classification::{ClassCounts, label},
};


/// Classification impurity calculator using the Gini index
/// `1 - Σ (count_k / total)^2`.
///
/// # Example
/// ```
/// use treeboosts::prelude::*;
///
/// let names   = [0.0, 1.0];
/// let targets = [0.0, 0.0, 1.0, 1.0];
///
/// let mut gini = GiniClassificationImpurityCalculator::new();
/// gini.init(&names, &targets, &[], Interval1D::new(0, 4)).unwrap();
///
/// let parent = gini.node_impurity();
/// assert_eq!(parent, 0.5);
///
/// gini.update_index(2).unwrap();
/// assert_eq!(gini.impurity_improvement(parent), 0.5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GiniClassificationImpurityCalculator<'a> {
    counts: ClassCounts<'a>,
}


impl GiniClassificationImpurityCalculator<'_> {
    /// Construct a new instance of
    /// `GiniClassificationImpurityCalculator`.
    /// Call [`ImpurityCalculator::init`] before using it.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}


/// Gini index of the counts in `counts` with mass `weight`.
/// An empty side has zero impurity.
#[inline(always)]
fn gini(counts: &TargetCounts, names: &[f64], weight: f64) -> f64 {
    if weight <= 0f64 { return 0f64; }

    let squares = names.iter()
        .map(|&name| counts[label(name)].powi(2))
        .sum::<f64>();

    1f64 - squares / weight.powi(2)
}


impl<'a> ImpurityCalculator<'a> for GiniClassificationImpurityCalculator<'a> {
    fn init(
        &mut self,
        target_names: &[f64],
        targets: &'a [f64],
        weights: &'a [f64],
        interval: Interval1D,
    ) -> Result<()>
    {
        self.counts.init(target_names, targets, weights, interval)
    }


    fn update_interval(&mut self, interval: Interval1D) -> Result<()> {
        self.counts.update_interval(interval)
    }


    fn update_index(&mut self, new_position: usize) -> Result<()> {
        self.counts.update_index(new_position)
    }


    fn reset(&mut self) {
        self.counts.reset();
    }


    fn child_impurities(&self) -> ChildImpurities {
        let c = &self.counts;
        let left = gini(&c.left, &c.target_names, c.weighted_left);
        let right = gini(&c.right, &c.target_names, c.weighted_right);
        ChildImpurities::new(left, right)
    }


    fn node_impurity(&self) -> f64 {
        let c = &self.counts;
        gini(&c.total, &c.target_names, c.weighted_total)
    }


    fn impurity_improvement(&self, impurity: f64) -> f64 {
        let ChildImpurities { left, right } = self.child_impurities();
        self.counts.improvement(impurity, left, right)
    }


    fn leaf_value(&self) -> f64 {
        self.counts.leaf_value()
    }


    fn leaf_probabilities(&self) -> Vec<f64> {
        self.counts.leaf_probabilities()
    }


    fn target_names(&self) -> &[f64] {
        &self.counts.target_names
    }


    fn weighted_left(&self) -> f64 {
        self.counts.weighted_left
    }


    fn weighted_right(&self) -> f64 {
        self.counts.weighted_right
    }
}
