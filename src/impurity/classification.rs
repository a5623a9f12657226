//! Running class counts shared by the classification calculators.
use crate::error::{Result, TreeError};
use crate::common::checker;
use super::{Interval1D, TargetCounts};


/// The state every classification calculator maintains:
/// weighted class counts for the whole interval and
/// for the left/right side of the cursor.
#[derive(Clone, Debug, Default)]
pub(super) struct ClassCounts<'a> {
    pub(super) interval: Interval1D,
    pub(super) current_position: usize,

    pub(super) weighted_total: f64,
    pub(super) weighted_left: f64,
    pub(super) weighted_right: f64,

    pub(super) total: TargetCounts,
    pub(super) left: TargetCounts,
    pub(super) right: TargetCounts,

    pub(super) targets: &'a [f64],
    pub(super) weights: &'a [f64],
    pub(super) target_names: Vec<f64>,
}


/// Returns the class label of a target value.
#[inline(always)]
pub(super) fn label(target: f64) -> i64 {
    target as i64
}


impl<'a> ClassCounts<'a> {
    pub(super) fn init(
        &mut self,
        target_names: &[f64],
        targets: &'a [f64],
        weights: &'a [f64],
        interval: Interval1D,
    ) -> Result<()>
    {
        if !weights.is_empty() {
            checker::length("weights", targets.len(), weights.len())?;
        }
        interval.check(targets.len())?;

        // The label range is re-derived on every call,
        // since the names may span negative labels this time.
        let (min_label, max_label) = target_names.iter()
            .map(|&name| label(name))
            .fold((i64::MAX, i64::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));

        // Labels between two names are not names themselves.
        let known = if min_label <= max_label {
            let mut known = vec![false; (max_label - min_label + 1) as usize];
            for &name in target_names {
                known[(label(name) - min_label) as usize] = true;
            }
            known
        } else {
            Vec::new()
        };
        let is_known = |y: i64| {
            y >= min_label && y <= max_label
                && known[(y - min_label) as usize]
        };

        // Nothing is touched until every label is accepted.
        if let Some(&y) = targets[interval.range()].iter()
            .find(|&&y| !is_known(label(y)))
        {
            return Err(TreeError::UnknownLabel(y));
        }

        self.targets = targets;
        self.weights = weights;
        self.interval = interval;
        if self.target_names.as_slice() != target_names {
            self.target_names = target_names.to_vec();
        }

        self.total.reset(min_label, max_label);
        self.left.reset(min_label, max_label);
        self.right.reset(min_label, max_label);

        self.weighted_total = 0f64;
        for i in interval.range() {
            let w = self.weight(i);
            self.total[label(targets[i])] += w;
            self.weighted_total += w;
        }

        self.reset();
        Ok(())
    }


    pub(super) fn update_interval(&mut self, interval: Interval1D)
        -> Result<()>
    {
        let names = self.target_names.clone();
        let targets = self.targets;
        let weights = self.weights;
        self.init(&names, targets, weights, interval)
    }


    pub(super) fn reset(&mut self) {
        self.current_position = self.interval.from_inclusive;

        self.weighted_left = 0f64;
        self.weighted_right = self.weighted_total;

        self.left.clear();
        self.right.set_counts(&self.total);
    }


    pub(super) fn update_index(&mut self, new_position: usize) -> Result<()> {
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

        let mut moved = 0f64;
        for i in self.current_position..new_position {
            let w = self.weight(i);
            let y = label(self.targets[i]);
            self.left[y] += w;
            self.right[y] -= w;
            moved += w;
        }

        self.weighted_left += moved;
        self.weighted_right -= moved;
        self.current_position = new_position;
        Ok(())
    }


    /// Returns the majority class.
    /// Ties go to the label listed first in `target_names`.
    pub(super) fn leaf_value(&self) -> f64 {
        let mut best = self.target_names.first().copied().unwrap_or(0f64);
        let mut max_weight = f64::MIN;
        for &name in self.target_names.iter() {
            let weight = self.total[label(name)];
            if weight > max_weight {
                max_weight = weight;
                best = name;
            }
        }
        best
    }


    /// Laplace-adjusted class probabilities in `target_names` order.
    pub(super) fn leaf_probabilities(&self) -> Vec<f64> {
        let n_class = self.target_names.len() as f64;
        let factor = 1f64 / (self.weighted_total + n_class);

        self.target_names.iter()
            .map(|&name| (self.total[label(name)] + 1f64) * factor)
            .collect()
    }


    /// Weighted-mean impurity of the two children,
    /// subtracted from `impurity`.
    pub(super) fn improvement(&self, impurity: f64, left: f64, right: f64)
        -> f64
    {
        if self.weighted_total <= 0f64 { return 0f64; }
        let lp = self.weighted_left / self.weighted_total;
        let rp = self.weighted_right / self.weighted_total;

        impurity - lp * left - rp * right
    }


    #[inline(always)]
    fn weight(&self, i: usize) -> f64 {
        if self.weights.is_empty() { 1f64 } else { self.weights[i] }
    }
}
