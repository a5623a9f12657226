//! Loss functions driving the gradient boosting trees.
//!
//! A loss supplies the pseudo-residuals the next tree is fitted to,
//! the split statistics the tree learner compares,
//! and optionally a second pass over the leaves
//! for losses whose optimal leaf value is not the mean residual.
use fixedbitset::FixedBitSet;

use crate::common::{checker, utils::masked_values, median, score_at_percentile};
use crate::error::Result;
use super::GBMSplitInfo;


/// The trait [`GradientBoostLoss`] defines the hooks
/// [`GBMDecisionTreeLearner`](super::GBMDecisionTreeLearner)
/// and [`GBM`](super::GBM) call into.
///
/// Every mask argument selects the rows the call works on.
/// The provided split methods use the squared residual statistics
/// of [`GBMSplitInfo`] and fit the mean residual.
/// [`BinomialLoss`] overrides them to fit a Newton step instead.
pub trait GradientBoostLoss {
    /// Returns the name of the loss.
    fn name(&self) -> &str;


    /// Returns the constant the ensemble starts from.
    fn initial_loss(&self, targets: &[f64], in_sample: &FixedBitSet) -> f64;


    /// Returns the split statistics of the rows in `in_sample`.
    fn init_split(
        &self,
        _targets: &[f64],
        residuals: &[f64],
        in_sample: &FixedBitSet,
    ) -> GBMSplitInfo
    {
        GBMSplitInfo::from_residuals(residuals, in_sample)
    }


    /// Returns the negative gradient of the loss at `prediction`.
    fn negative_gradient(&self, target: f64, prediction: f64) -> f64;


    /// Overwrite `residuals[i]` for every row `i` in `in_sample`
    /// with the negative gradient at `predictions[i]`.
    fn update_residuals(
        &mut self,
        targets: &[f64],
        predictions: &[f64],
        residuals: &mut [f64],
        in_sample: &FixedBitSet,
    )
    {
        for i in in_sample.ones() {
            residuals[i] = self.negative_gradient(targets[i], predictions[i]);
        }
    }


    /// Move the row with `residual` from `right` to `left`.
    fn update_split_constants(
        &self,
        left: &mut GBMSplitInfo,
        right: &mut GBMSplitInfo,
        _target: f64,
        residual: f64,
    )
    {
        left.add(residual);
        right.remove(residual);
    }


    /// Returns `true` if the leaf constants must be refined
    /// by [`GradientBoostLoss::updated_leaf_value`].
    fn update_leaf_values(&self) -> bool;


    /// Returns the refined constant of a leaf holding `in_sample`.
    fn updated_leaf_value(
        &self,
        current_leaf_value: f64,
        targets: &[f64],
        predictions: &[f64],
        in_sample: &FixedBitSet,
    ) -> f64;


    /// Returns the mean loss of `predictions`.
    /// Used for progress reports.
    fn loss(&self, targets: &[f64], predictions: &[f64]) -> f64;
}


/// Least squares loss `(y - p)^2 / 2`.
/// Residuals are `y - p` and a leaf predicts their mean.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SquaredLoss;


impl SquaredLoss {
    /// Construct a new instance of `SquaredLoss`.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}


impl GradientBoostLoss for SquaredLoss {
    fn name(&self) -> &str {
        "Squared loss"
    }


    fn initial_loss(&self, targets: &[f64], in_sample: &FixedBitSet) -> f64 {
        let n = in_sample.count_ones(..);
        if n == 0 { return 0f64; }
        in_sample.ones().map(|i| targets[i]).sum::<f64>() / n as f64
    }


    fn negative_gradient(&self, target: f64, prediction: f64) -> f64 {
        target - prediction
    }


    fn update_leaf_values(&self) -> bool {
        false
    }


    fn updated_leaf_value(
        &self,
        current_leaf_value: f64,
        _targets: &[f64],
        _predictions: &[f64],
        _in_sample: &FixedBitSet,
    ) -> f64
    {
        current_leaf_value
    }


    fn loss(&self, targets: &[f64], predictions: &[f64]) -> f64 {
        mean_of(targets, predictions, |y, p| (y - p).powi(2))
    }
}


/// Least absolute deviation loss `|y - p|`.
/// Residuals are `sign(y - p)` and a leaf predicts
/// the median of `y - p`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbsoluteLoss;


impl AbsoluteLoss {
    /// Construct a new instance of `AbsoluteLoss`.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}


impl GradientBoostLoss for AbsoluteLoss {
    fn name(&self) -> &str {
        "Absolute loss"
    }


    fn initial_loss(&self, targets: &[f64], in_sample: &FixedBitSet) -> f64 {
        median(&masked_values(in_sample, |i| targets[i]))
    }


    fn negative_gradient(&self, target: f64, prediction: f64) -> f64 {
        if target - prediction > 0f64 { 1f64 } else { -1f64 }
    }


    fn update_leaf_values(&self) -> bool {
        true
    }


    fn updated_leaf_value(
        &self,
        _current_leaf_value: f64,
        targets: &[f64],
        predictions: &[f64],
        in_sample: &FixedBitSet,
    ) -> f64
    {
        median(&masked_values(in_sample, |i| targets[i] - predictions[i]))
    }


    fn loss(&self, targets: &[f64], predictions: &[f64]) -> f64 {
        mean_of(targets, predictions, |y, p| (y - p).abs())
    }
}


/// Quantile loss for the `alpha`-quantile.
/// Residuals are `alpha` above the prediction
/// and `-(1 - alpha)` at or below it.
/// A leaf predicts the `alpha`-percentile of `y - p`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantileLoss {
    alpha: f64,
}


impl QuantileLoss {
    /// Construct a new instance of `QuantileLoss`.
    /// `alpha` must be in `(0, 1]`.
    pub fn new(alpha: f64) -> Result<Self> {
        checker::alpha(alpha)?;
        Ok(Self { alpha })
    }


    /// Returns the quantile this loss targets.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}


impl GradientBoostLoss for QuantileLoss {
    fn name(&self) -> &str {
        "Quantile loss"
    }


    fn initial_loss(&self, targets: &[f64], in_sample: &FixedBitSet) -> f64 {
        let values = masked_values(in_sample, |i| targets[i]);
        score_at_percentile(&values, self.alpha)
    }


    fn negative_gradient(&self, target: f64, prediction: f64) -> f64 {
        if target > prediction { self.alpha } else { -(1f64 - self.alpha) }
    }


    fn update_leaf_values(&self) -> bool {
        true
    }


    fn updated_leaf_value(
        &self,
        _current_leaf_value: f64,
        targets: &[f64],
        predictions: &[f64],
        in_sample: &FixedBitSet,
    ) -> f64
    {
        let diff = masked_values(in_sample, |i| targets[i] - predictions[i]);
        score_at_percentile(&diff, self.alpha)
    }


    fn loss(&self, targets: &[f64], predictions: &[f64]) -> f64 {
        let alpha = self.alpha;
        mean_of(targets, predictions, |y, p| {
            let d = y - p;
            if d > 0f64 { alpha * d } else { (alpha - 1f64) * d }
        })
    }
}


/// Huber loss, quadratic for small residuals and linear for large ones.
///
/// At every iteration the cut-off `gamma` is re-estimated
/// as the `alpha`-percentile of `|y - p|`
/// and the residuals are clipped to `[-gamma, gamma]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HuberLoss {
    alpha: f64,
    gamma: f64,
}


impl HuberLoss {
    /// Construct a new instance of `HuberLoss`.
    /// `alpha` must be in `(0, 1]`.
    pub fn new(alpha: f64) -> Result<Self> {
        checker::alpha(alpha)?;
        Ok(Self { alpha, gamma: 0f64 })
    }


    /// Returns the percentile used to pick `gamma`.
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }


    /// Returns the cut-off of the last residual update.
    #[inline]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}


impl GradientBoostLoss for HuberLoss {
    fn name(&self) -> &str {
        "Huber loss"
    }


    fn initial_loss(&self, targets: &[f64], in_sample: &FixedBitSet) -> f64 {
        median(&masked_values(in_sample, |i| targets[i]))
    }


    fn negative_gradient(&self, target: f64, prediction: f64) -> f64 {
        let d = target - prediction;
        if d.abs() <= self.gamma { d } else { self.gamma * d.signum() }
    }


    fn update_residuals(
        &mut self,
        targets: &[f64],
        predictions: &[f64],
        residuals: &mut [f64],
        in_sample: &FixedBitSet,
    )
    {
        let abs_diff = masked_values(
            in_sample, |i| (targets[i] - predictions[i]).abs()
        );
        self.gamma = score_at_percentile(&abs_diff, self.alpha);

        for i in in_sample.ones() {
            residuals[i] = self.negative_gradient(targets[i], predictions[i]);
        }
    }


    fn update_leaf_values(&self) -> bool {
        true
    }


    fn updated_leaf_value(
        &self,
        _current_leaf_value: f64,
        targets: &[f64],
        predictions: &[f64],
        in_sample: &FixedBitSet,
    ) -> f64
    {
        let diff = masked_values(in_sample, |i| targets[i] - predictions[i]);
        if diff.is_empty() { return 0f64; }

        let median = median(&diff);
        let shift = diff.iter()
            .map(|d| {
                let md = d - median;
                md.signum() * md.abs().min(self.gamma)
            })
            .sum::<f64>()
            / diff.len() as f64;

        median + shift
    }


    fn loss(&self, targets: &[f64], predictions: &[f64]) -> f64 {
        let gamma = self.gamma;
        mean_of(targets, predictions, |y, p| {
            let d = (y - p).abs();
            if d <= gamma {
                0.5 * d * d
            } else {
                gamma * (d - 0.5 * gamma)
            }
        })
    }
}


/// Binomial deviance for `0`/`1` targets.
///
/// Predictions are log-odds and residuals are `y - σ(p)`.
/// A leaf predicts one Newton step,
/// `Σr / Σσ(p)(1 - σ(p))`,
/// where `σ(p)(1 - σ(p)) = (y - r)(1 - y + r)`
/// is recovered from the target and the residual.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BinomialLoss;


impl BinomialLoss {
    /// Construct a new instance of `BinomialLoss`.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}


impl GradientBoostLoss for BinomialLoss {
    fn name(&self) -> &str {
        "Binomial loss"
    }


    /// The log-odds of the positive rows in `in_sample`.
    fn initial_loss(&self, targets: &[f64], in_sample: &FixedBitSet) -> f64 {
        let n = in_sample.count_ones(..) as f64;
        let positives = in_sample.ones().map(|i| targets[i]).sum::<f64>();
        nan_to_num((positives / (n - positives)).ln())
    }


    fn init_split(
        &self,
        targets: &[f64],
        residuals: &[f64],
        in_sample: &FixedBitSet,
    ) -> GBMSplitInfo
    {
        let mut info = GBMSplitInfo::from_residuals(residuals, in_sample);
        info.binomial_sum = in_sample.ones()
            .map(|i| binomial_term(targets[i], residuals[i]))
            .sum();
        info.best_constant = newton_step(&info);
        info
    }


    fn negative_gradient(&self, target: f64, prediction: f64) -> f64 {
        nan_to_num(target - sigmoid(prediction))
    }


    fn update_split_constants(
        &self,
        left: &mut GBMSplitInfo,
        right: &mut GBMSplitInfo,
        target: f64,
        residual: f64,
    )
    {
        let term = binomial_term(target, residual);

        left.add(residual);
        left.binomial_sum += term;
        left.best_constant = newton_step(left);

        right.remove(residual);
        right.binomial_sum -= term;
        right.best_constant = newton_step(right);
    }


    fn update_leaf_values(&self) -> bool {
        false
    }


    fn updated_leaf_value(
        &self,
        current_leaf_value: f64,
        _targets: &[f64],
        _predictions: &[f64],
        _in_sample: &FixedBitSet,
    ) -> f64
    {
        current_leaf_value
    }


    /// Mean negative log-likelihood, `log(1 + e^p) - y p`.
    fn loss(&self, targets: &[f64], predictions: &[f64]) -> f64 {
        mean_of(targets, predictions, |y, p| {
            let softplus = p.max(0f64) + (-p.abs()).exp().ln_1p();
            softplus - y * p
        })
    }
}


/// The logistic function `1 / (1 + e^-x)`.
#[inline(always)]
pub(crate) fn sigmoid(x: f64) -> f64 {
    1f64 / (1f64 + (-x).exp())
}


/// Maps `NaN` to `0` and the infinities to the extreme finite values.
#[inline(always)]
fn nan_to_num(x: f64) -> f64 {
    if x.is_nan() {
        0f64
    } else {
        x.clamp(f64::MIN, f64::MAX)
    }
}


/// `σ(1 - σ)` of a row, where `σ = target - residual`.
#[inline(always)]
fn binomial_term(target: f64, residual: f64) -> f64 {
    (target - residual) * (1f64 - target + residual)
}


#[inline(always)]
fn newton_step(info: &GBMSplitInfo) -> f64 {
    if info.samples == 0 || info.binomial_sum == 0f64 {
        0f64
    } else {
        info.sum / info.binomial_sum
    }
}


/// Mean of `f(y, p)` over aligned targets and predictions.
#[inline]
fn mean_of<F>(targets: &[f64], predictions: &[f64], f: F) -> f64
    where F: Fn(f64, f64) -> f64,
{
    let n = targets.len().min(predictions.len());
    if n == 0 { return 0f64; }

    targets.iter()
        .zip(predictions)
        .map(|(&y, &p)| f(y, p))
        .sum::<f64>()
        / n as f64
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::common::mask_from_indices;
    use crate::error::TreeError;

    fn full_mask(n: usize) -> FixedBitSet {
        mask_from_indices(&(0..n).collect::<Vec<_>>(), n)
    }

    #[test]
    fn test_squared_residuals_01() {
        let targets = (1..=9).map(|y| y as f64).collect::<Vec<_>>();
        let predictions = vec![5.0; 9];
        let mut residuals = vec![0.0; 9];

        let mut loss = SquaredLoss::new();
        loss.update_residuals(
            &targets, &predictions, &mut residuals, &full_mask(9)
        );

        let exp = vec![-4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(exp, residuals, "expected {exp:?}, got {residuals:?}.");
    }

    #[test]
    fn test_squared_initial_loss_01() {
        let targets = [1.0, 2.0, 3.0, 100.0];
        let mask = mask_from_indices(&[0, 1, 2], 4);
        assert_eq!(2.0, SquaredLoss::new().initial_loss(&targets, &mask));
        assert!(!SquaredLoss::new().update_leaf_values());
    }

    #[test]
    fn test_residuals_respect_mask_01() {
        let targets = [1.0, 2.0, 3.0];
        let predictions = [0.0; 3];
        let mut residuals = vec![-7.0; 3];

        let mut loss = AbsoluteLoss::new();
        let mask = mask_from_indices(&[1], 3);
        loss.update_residuals(&targets, &predictions, &mut residuals, &mask);
        assert_eq!(vec![-7.0, 1.0, -7.0], residuals);
    }

    #[test]
    fn test_absolute_loss_01() {
        let loss = AbsoluteLoss::new();
        assert_eq!(1.0, loss.negative_gradient(2.0, 1.0));
        assert_eq!(-1.0, loss.negative_gradient(1.0, 2.0));
        assert_eq!(-1.0, loss.negative_gradient(1.0, 1.0));

        let targets = [1.0, 2.0, 10.0, 4.0];
        let predictions = [0.0, 0.0, 0.0, 0.0];
        let mask = full_mask(4);
        assert_eq!(3.0, loss.initial_loss(&targets, &mask));
        let res = loss.updated_leaf_value(0.0, &targets, &predictions, &mask);
        assert_eq!(3.0, res);
    }

    #[test]
    fn test_quantile_loss_01() {
        let loss = QuantileLoss::new(0.9).unwrap();
        assert_eq!(0.9, loss.negative_gradient(2.0, 1.0));
        assert_abs_diff_eq!(-0.1, loss.negative_gradient(1.0, 1.0), epsilon = 1e-12);

        let targets = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mask = full_mask(5);
        assert_abs_diff_eq!(4.6, loss.initial_loss(&targets, &mask), epsilon = 1e-12);
    }

    #[test]
    fn test_quantile_loss_02() {
        let exp = Err(TreeError::InvalidAlpha(0.0));
        assert_eq!(exp, QuantileLoss::new(0.0));
        assert!(QuantileLoss::new(1.5).is_err());
        assert!(QuantileLoss::new(1.0).is_ok());
    }

    #[test]
    fn test_huber_loss_01() {
        let targets = [0.0, 1.0, 2.0, 3.0, 10.0];
        let predictions = [0.0; 5];
        let mut residuals = vec![0.0; 5];
        let mask = full_mask(5);

        let mut loss = HuberLoss::new(0.5).unwrap();
        loss.update_residuals(&targets, &predictions, &mut residuals, &mask);

        assert_eq!(2.0, loss.gamma());
        assert_eq!(vec![0.0, 1.0, 2.0, 2.0, 2.0], residuals);

        // median is 2, clipped deviations are -2, -1, 0, 1, 2.
        let res = loss.updated_leaf_value(0.0, &targets, &predictions, &mask);
        assert_abs_diff_eq!(2.0, res, epsilon = 1e-12);
    }

    #[test]
    fn test_binomial_loss_01() {
        let loss = BinomialLoss::new();
        let targets = [1.0, 1.0, 1.0, 0.0, 0.0];
        let mask = mask_from_indices(&[0, 1, 2, 3], 5);
        assert_abs_diff_eq!(3f64.ln(), loss.initial_loss(&targets, &mask), epsilon = 1e-12);

        // A single class has no finite log-odds.
        let mask = mask_from_indices(&[0, 1], 5);
        assert_eq!(f64::MAX, loss.initial_loss(&targets, &mask));
        let mask = mask_from_indices(&[3, 4], 5);
        assert_eq!(f64::MIN, loss.initial_loss(&targets, &mask));

        assert_eq!(0.5, loss.negative_gradient(1.0, 0.0));
        assert_eq!(-0.5, loss.negative_gradient(0.0, 0.0));
        assert_abs_diff_eq!(0.25, loss.negative_gradient(1.0, 3f64.ln()), epsilon = 1e-12);
        assert!(!loss.update_leaf_values());
    }

    #[test]
    fn test_binomial_loss_02() {
        let loss = BinomialLoss::new();
        let res = loss.loss(&[1.0, 0.0], &[0.0, 0.0]);
        assert_abs_diff_eq!(2f64.ln(), res, epsilon = 1e-12);

        // Confident and right costs almost nothing, even far out.
        let res = loss.loss(&[1.0, 0.0], &[800.0, -800.0]);
        assert_abs_diff_eq!(0.0, res, epsilon = 1e-12);
    }

    #[test]
    fn test_binomial_split_constants_01() {
        let loss = BinomialLoss::new();
        let targets = [1.0, 0.0, 1.0];
        let predictions = [0.0; 3];
        let mut residuals = vec![0.0; 3];
        let mask = full_mask(3);
        BinomialLoss::new().update_residuals(
            &targets, &predictions, &mut residuals, &mask
        );
        assert_eq!(vec![0.5, -0.5, 0.5], residuals);

        // Every row has `σ(1 - σ) = 0.25`.
        let mut left = GBMSplitInfo::new();
        let mut right = loss.init_split(&targets, &residuals, &mask);
        assert_abs_diff_eq!(0.75, right.binomial_sum);
        assert_abs_diff_eq!(0.5 / 0.75, right.best_constant, epsilon = 1e-12);
        assert_abs_diff_eq!(0.75 - 0.25 / 3.0, right.cost, epsilon = 1e-12);

        loss.update_split_constants(&mut left, &mut right, 1.0, 0.5);
        assert_abs_diff_eq!(2.0, left.best_constant, epsilon = 1e-12);
        assert_abs_diff_eq!(0.0, right.best_constant, epsilon = 1e-12);

        loss.update_split_constants(&mut left, &mut right, 0.0, -0.5);
        assert_abs_diff_eq!(0.0, left.best_constant, epsilon = 1e-12);
        assert_abs_diff_eq!(2.0, right.best_constant, epsilon = 1e-12);

        loss.update_split_constants(&mut left, &mut right, 1.0, 0.5);
        assert_eq!(0, right.samples);
        assert_eq!(0f64, right.best_constant);
        assert_abs_diff_eq!(0.5 / 0.75, left.best_constant, epsilon = 1e-12);
    }

    #[test]
    fn test_split_constants_01() {
        let residuals = [1.0, 2.0, 3.0];
        let mask = full_mask(3);
        let loss = SquaredLoss::new();

        let mut left = GBMSplitInfo::new();
        let mut right = loss.init_split(&[0.0; 3], &residuals, &mask);
        assert_abs_diff_eq!(2.0, right.cost, epsilon = 1e-12);

        loss.update_split_constants(&mut left, &mut right, 0.0, 1.0);
        assert_eq!(1, left.samples);
        assert_eq!(2, right.samples);
        assert_abs_diff_eq!(1.0, left.best_constant);
        assert_abs_diff_eq!(2.5, right.best_constant);
        assert_abs_diff_eq!(0.5, right.cost, epsilon = 1e-12);
    }
}
