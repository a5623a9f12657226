//! This file provides some common functions
//! such as presorting and order statistics.
use fixedbitset::FixedBitSet;
use rayon::prelude::*;

use crate::F64Matrix;


/// Returns, for each feature, the row indices
/// sorted in ascending order of the feature value.
///
/// The sort is stable, so rows with equal values keep their row order.
/// The result is computed once per training set
/// and shared read-only by every tree of a boosting run.
pub fn ordered_elements(observations: &F64Matrix) -> Vec<Vec<usize>> {
    let (n_sample, n_feature) = observations.shape();

    (0..n_feature).into_par_iter()
        .map(|j| {
            let column = observations.column(j);
            let mut indices = (0..n_sample).collect::<Vec<_>>();
            indices.sort_by(|&a, &b| column[a].total_cmp(&column[b]));
            indices
        })
        .collect()
}


/// Returns a mask of length `n_sample` with the bits of `indices` set.
pub fn mask_from_indices(indices: &[usize], n_sample: usize) -> FixedBitSet {
    let mut mask = FixedBitSet::with_capacity(n_sample);
    indices.iter()
        .for_each(|&i| { mask.insert(i); });
    mask
}


/// Collects `f(i)` for every row `i` in `mask`, in row order.
#[inline]
pub(crate) fn masked_values<F>(mask: &FixedBitSet, f: F) -> Vec<f64>
    where F: FnMut(usize) -> f64,
{
    mask.ones()
        .map(f)
        .collect()
}


/// Returns the median of `values`.
/// For an even number of values, the mean of the two middle values.
/// Returns `0.0` for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 { return 0f64; }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = n / 2;
    if n % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    }
}


/// Returns the score at percentile `p` (`p` in `[0, 1]`) of `values`,
/// interpolating linearly between the two closest ranks.
/// Returns `0.0` for an empty slice.
pub fn score_at_percentile(values: &[f64], p: f64) -> f64 {
    let n = values.len();
    if n == 0 { return 0f64; }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = p.clamp(0f64, 1f64) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_elements_01() {
        let m = F64Matrix::from_rows(&[
            [3.0, 1.0],
            [1.0, 1.0],
            [2.0, 0.0],
        ]).unwrap();
        let res = ordered_elements(&m);
        let exp = vec![vec![1, 2, 0], vec![2, 0, 1]];
        assert_eq!(exp, res, "expected {exp:?}, got {res:?}.");
    }

    #[test]
    fn test_median_01() {
        let res = median(&[5.0, 1.0, 3.0]);
        let exp = 3.0;
        assert_eq!(exp, res, "expected {exp:?}, got {res:?}.");
    }

    #[test]
    fn test_median_02() {
        let res = median(&[4.0, 1.0, 3.0, 2.0]);
        let exp = 2.5;
        assert_eq!(exp, res, "expected {exp:?}, got {res:?}.");
    }

    #[test]
    fn test_score_at_percentile_01() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(1.0, score_at_percentile(&values, 0.0));
        assert_eq!(3.0, score_at_percentile(&values, 0.5));
        assert_eq!(5.0, score_at_percentile(&values, 1.0));
        assert_eq!(1.5, score_at_percentile(&values, 0.125));
    }

    #[test]
    fn test_mask_from_indices_01() {
        let mask = mask_from_indices(&[0, 2], 4);
        let res = mask.ones().collect::<Vec<_>>();
        let exp = vec![0, 2];
        assert_eq!(exp, res, "expected {exp:?}, got {res:?}.");
        assert_eq!(4, mask.len());
    }
}
