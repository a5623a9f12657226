//! Dense weighted class counts indexed by `label - offset`.
use std::ops::{Index, IndexMut};


/// Weighted count per class label.
///
/// Labels are integral values stored as `f64`.
/// The buffer covers every label in `[offset, offset + len)`,
/// so a lookup is a subtraction and an array access.
/// The buffer is resized only when the label range changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetCounts {
    counts: Vec<f64>,
    offset: i64,
}


impl TargetCounts {
    /// Construct an empty instance of `TargetCounts`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }


    /// Re-derive the label range to `[min_label, max_label]`
    /// and zero every count.
    /// An empty range (`max_label < min_label`) leaves no slot.
    pub fn reset(&mut self, min_label: i64, max_label: i64) {
        let size = if max_label < min_label {
            0
        } else {
            (max_label - min_label + 1) as usize
        };
        self.offset = min_label;
        self.counts.resize(size, 0f64);
        self.clear();
    }


    /// Zero every count, keeping the label range.
    #[inline]
    pub fn clear(&mut self) {
        self.counts.iter_mut()
            .for_each(|c| { *c = 0f64; });
    }


    /// Copy the counts of `other` into `self`.
    #[inline]
    pub fn set_counts(&mut self, other: &Self) {
        self.offset = other.offset;
        self.counts.clone_from(&other.counts);
    }


    /// Returns the smallest label covered.
    #[inline]
    pub fn offset(&self) -> i64 {
        self.offset
    }


    /// Returns the number of labels covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }


    /// Returns `true` if no label is covered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }


    /// Returns `true` if `label` has a slot.
    #[inline]
    pub fn covers(&self, label: i64) -> bool {
        self.slot(label).is_some()
    }


    /// Returns the count of `label`, or `None` if it has no slot.
    #[inline]
    pub fn get(&self, label: i64) -> Option<f64> {
        self.slot(label).map(|i| self.counts[i])
    }


    /// Returns the sum of all counts.
    #[inline]
    pub fn total(&self) -> f64 {
        self.counts.iter().sum::<f64>()
    }


    #[inline(always)]
    fn slot(&self, label: i64) -> Option<usize> {
        let i = label.checked_sub(self.offset)?;
        if i < 0 || i as usize >= self.counts.len() {
            return None;
        }
        Some(i as usize)
    }
}


impl Index<i64> for TargetCounts {
    type Output = f64;
    #[inline(always)]
    fn index(&self, label: i64) -> &Self::Output {
        let i = self.slot(label)
            .unwrap_or_else(|| panic!("label {label} has no slot"));
        &self.counts[i]
    }
}


impl IndexMut<i64> for TargetCounts {
    #[inline(always)]
    fn index_mut(&mut self, label: i64) -> &mut Self::Output {
        let i = self.slot(label)
            .unwrap_or_else(|| panic!("label {label} has no slot"));
        &mut self.counts[i]
    }
}
