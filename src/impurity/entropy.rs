//! Classification impurity calculator using the Shannon entropy.
use crate::error::Result;
use super::{
    Interval1D,
    TargetCounts,
    ImpurityCalculator,
    ChildImpurities,
    classification::{ClassCounts, label},
};


/// Classification impurity calculator using the entropy
/// `- Σ p_k ln p_k`, where `p_k = count_k / total`.
///
/// Shares the running-count bookkeeping with
/// [`GiniClassificationImpurityCalculator`](super::GiniClassificationImpurityCalculator);
/// only the impurity measure differs.
#[derive(Clone, Debug, Default)]
pub struct EntropyClassificationImpurityCalculator<'a> {
    counts: ClassCounts<'a>,
}


impl EntropyClassificationImpurityCalculator<'_> {
    /// Construct a new instance of
    /// `EntropyClassificationImpurityCalculator`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}


#[inline(always)]
fn entropy(counts: &TargetCounts, names: &[f64], weight: f64) -> f64 {
    if weight <= 0f64 { return 0f64; }

    names.iter()
        .map(|&name| counts[label(name)] / weight)
        .filter(|&p| p > 0f64)
        .map(|p| -p * p.ln())
        .sum::<f64>()
}


impl<'a> ImpurityCalculator<'a> for EntropyClassificationImpurityCalculator<'a> {
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
        let left = entropy(&c.left, &c.target_names, c.weighted_left);
        let right = entropy(&c.right, &c.target_names, c.weighted_right);
        ChildImpurities::new(left, right)
    }


    fn node_impurity(&self) -> f64 {
        let c = &self.counts;
        entropy(&c.total, &c.target_names, c.weighted_total)
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


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const NAMES: [f64; 2] = [-1.0, 1.0];
    const TARGETS: [f64; 6] = [-1.0, -1.0, -1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_node_impurity_01() {
        let mut entropy = EntropyClassificationImpurityCalculator::new();
        entropy.init(&NAMES, &TARGETS, &[], Interval1D::new(0, 6)).unwrap();
        let res = entropy.node_impurity();
        assert_abs_diff_eq!(2f64.ln(), res, epsilon = 1e-12);
    }

    #[test]
    fn test_node_impurity_02() {
        let mut entropy = EntropyClassificationImpurityCalculator::new();
        entropy.init(&NAMES, &TARGETS, &[], Interval1D::new(3, 6)).unwrap();
        assert_eq!(0f64, entropy.node_impurity());
    }

    #[test]
    fn test_impurity_improvement_01() {
        let mut entropy = EntropyClassificationImpurityCalculator::new();
        entropy.init(&NAMES, &TARGETS, &[], Interval1D::new(0, 6)).unwrap();
        let parent = entropy.node_impurity();

        entropy.update_index(3).unwrap();
        let res = entropy.impurity_improvement(parent);
        assert_abs_diff_eq!(parent, res, epsilon = 1e-12);

        entropy.reset();
        assert_eq!(0f64, entropy.weighted_left());
        assert_eq!(6f64, entropy.weighted_right());
        assert_abs_diff_eq!(0f64, entropy.impurity_improvement(parent), epsilon = 1e-12);
    }

    #[test]
    fn test_impurity_improvement_02() {
        let mut entropy = EntropyClassificationImpurityCalculator::new();
        entropy.init(&NAMES, &TARGETS, &[], Interval1D::new(0, 6)).unwrap();
        let parent = entropy.node_impurity();

        entropy.update_index(2).unwrap();
        let right = -(0.25 * 0.25f64.ln() + 0.75 * 0.75f64.ln());
        let exp = parent - (4.0 / 6.0) * right;
        let res = entropy.impurity_improvement(parent);
        assert_abs_diff_eq!(exp, res, epsilon = 1e-12);
    }
}
