//! Regression impurity calculator using the weighted variance.
use crate::error::{Result, TreeError};
use crate::common::checker;
use super::{
    Interval1D,
    ImpurityCalculator,
    ChildImpurities,
};


/// Running weighted sums of one side of the cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Moments {
    weight: f64,
    sum: f64,
    sum_of_squares: f64,
}


impl Moments {
    #[inline(always)]
    fn push(&mut self, w: f64, y: f64) {
        self.weight += w;
        self.sum += w * y;
        self.sum_of_squares += w * y * y;
    }


    #[inline(always)]
    fn pop(&mut self, w: f64, y: f64) {
        self.weight -= w;
        self.sum -= w * y;
        self.sum_of_squares -= w * y * y;
    }


    #[inline(always)]
    fn mean(&self) -> f64 {
        if self.weight <= 0f64 { 0f64 } else { self.sum / self.weight }
    }


    /// Weighted variance `E[y^2] - E[y]^2`.
    /// An empty side has zero variance.
    #[inline(always)]
    fn variance(&self) -> f64 {
        if self.weight <= 0f64 { return 0f64; }
        let mean = self.mean();
        self.sum_of_squares / self.weight - mean * mean
    }
}


/// Regression impurity calculator.
/// The impurity of a node is the weighted variance of its targets,
/// and the improvement of a split is Friedman's criterion
/// `wL * wR * (meanL - meanR)^2 / (wL + wR)`.
///
/// All aggregates are kept incrementally,
/// so [`ImpurityCalculator::update_index`] costs `O(Δposition)`.
#[derive(Clone, Debug, Default)]
pub struct RegressionImpurityCalculator<'a> {
    interval: Interval1D,
    current_position: usize,

    total: Moments,
    left: Moments,
    right: Moments,

    targets: &'a [f64],
    weights: &'a [f64],
}


impl RegressionImpurityCalculator<'_> {
    /// Construct a new instance of `RegressionImpurityCalculator`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }


    #[inline(always)]
    fn weight(&self, i: usize) -> f64 {
        if self.weights.is_empty() { 1f64 } else { self.weights[i] }
    }
}


impl<'a> ImpurityCalculator<'a> for RegressionImpurityCalculator<'a> {
    fn init(
        &mut self,
        _target_names: &[f64],
        targets: &'a [f64],
        weights: &'a [f64],
        interval: Interval1D,
    ) -> Result<()>
    {
        if !weights.is_empty() {
            checker::length("weights", targets.len(), weights.len())?;
        }
        interval.check(targets.len())?;

        self.targets = targets;
        self.weights = weights;
        self.interval = interval;

        self.total = Moments::default();
        for i in interval.range() {
            let w = self.weight(i);
            self.total.push(w, targets[i]);
        }

        self.reset();
        Ok(())
    }


    fn update_interval(&mut self, interval: Interval1D) -> Result<()> {
        let targets = self.targets;
        let weights = self.weights;
        self.init(&[], targets, weights, interval)
    }


    fn update_index(&mut self, new_position: usize) -> Result<()> {
        if new_position < self.current_position {
            return Err(TreeError::NonMonotonicPosition {
                current: self.current_position,
                requested: new_position,
            });
        }
        if new_position > self.interval.to_exclusive {
            return Err(TreeError::PositionOutOfInterval {
                position: new_position,
                from: self.interval.from_inclusive,
                to: self.interval.to_exclusive,
            });
        }

        for i in self.current_position..new_position {
            let w = self.weight(i);
            let y = self.targets[i];
            self.left.push(w, y);
            self.right.pop(w, y);
        }
        self.current_position = new_position;
        Ok(())
    }


    fn reset(&mut self) {
        self.current_position = self.interval.from_inclusive;
        self.left = Moments::default();
        self.right = self.total;
    }


    fn child_impurities(&self) -> ChildImpurities {
        ChildImpurities::new(self.left.variance(), self.right.variance())
    }


    fn node_impurity(&self) -> f64 {
        self.total.variance()
    }


    fn impurity_improvement(&self, _impurity: f64) -> f64 {
        let wl = self.left.weight;
        let wr = self.right.weight;
        if wl <= 0f64 || wr <= 0f64 { return 0f64; }

        let diff = self.left.mean() - self.right.mean();
        wl * wr * diff * diff / (wl + wr)
    }


    fn leaf_value(&self) -> f64 {
        self.total.mean()
    }


    fn leaf_probabilities(&self) -> Vec<f64> {
        Vec::new()
    }


    fn target_names(&self) -> &[f64] {
        &[]
    }


    fn weighted_left(&self) -> f64 {
        self.left.weight
    }


    fn weighted_right(&self) -> f64 {
        self.right.weight
    }
}
