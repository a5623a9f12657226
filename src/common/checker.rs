//! This file defines some functions that checks some pre-conditions
//! E.g., Shape of data, range of the hyper-parameters.
//!
//! Every checker returns `Err` instead of panicking
//! so that a learner can report a bad configuration to its caller.

use fixedbitset::FixedBitSet;

use crate::error::{Result, TreeError};
use crate::F64Matrix;


/// Check that `len` equals `expected`.
#[inline(always)]
pub(crate) fn length(what: &'static str, expected: usize, len: usize)
    -> Result<()>
{
    if expected != len {
        return Err(TreeError::LengthMismatch { what, expected, got: len });
    }
    Ok(())
}


/// Check whether the observations and the targets are aligned
/// and non-empty.
#[inline(always)]
pub(crate) fn observations_and_targets(
    observations: &F64Matrix,
    targets: &[f64],
) -> Result<()>
{
    let (n_sample, _) = observations.shape();
    length("targets", n_sample, targets.len())?;

    // The previous check guarantees `n_sample == targets.len()`.
    if n_sample == 0 {
        return Err(TreeError::EmptySample);
    }
    Ok(())
}


/// Check that all indices point into `0..n_sample`.
#[inline(always)]
pub(crate) fn indices(indices: &[usize], n_sample: usize) -> Result<()> {
    if indices.is_empty() {
        return Err(TreeError::EmptySample);
    }
    match indices.iter().find(|&&i| i >= n_sample) {
        Some(&i) => Err(TreeError::LengthMismatch {
            what: "indices",
            expected: n_sample,
            got: i + 1,
        }),
        None => Ok(()),
    }
}


/// Check that the in-sample mask selects at least one row.
#[inline(always)]
pub(crate) fn mask(mask: &FixedBitSet, n_sample: usize) -> Result<()> {
    length("in-sample mask", n_sample, mask.len())?;
    if mask.count_ones(..) == 0 {
        return Err(TreeError::EmptySample);
    }
    Ok(())
}


/// Check the number of features searched at each split.
/// `0` means all features.
#[inline(always)]
pub(crate) fn features_to_use(requested: usize, available: usize)
    -> Result<()>
{
    if requested > available {
        return Err(TreeError::FeaturesPrSplitTooLarge {
            requested,
            available,
        });
    }
    Ok(())
}


/// Check the quantile parameter of a loss.
#[inline(always)]
pub(crate) fn alpha(alpha: f64) -> Result<()> {
    if alpha <= 0f64 || alpha > 1f64 || alpha.is_nan() {
        return Err(TreeError::InvalidAlpha(alpha));
    }
    Ok(())
}


/// Check the parameters of a boosting run.
#[inline(always)]
pub(crate) fn boosting(
    iterations: usize,
    learning_rate: f64,
    subsample_ratio: f64,
) -> Result<()>
{
    if iterations == 0 {
        return Err(TreeError::InvalidIterations(iterations));
    }
    if learning_rate.is_nan() || learning_rate <= 0f64 {
        return Err(TreeError::InvalidLearningRate(learning_rate));
    }
    let ratio = subsample_ratio;
    if ratio.is_nan() || ratio <= 0f64 || ratio > 1f64 {
        return Err(TreeError::InvalidSubsampleRatio(ratio));
    }
    Ok(())
}
