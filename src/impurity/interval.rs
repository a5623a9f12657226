//! Defines the half-open index range a tree node works on.
use serde::{Serialize, Deserialize};

use std::fmt;
use std::ops::Range;

use crate::error::{Result, TreeError};


/// A half-open interval `[from_inclusive, to_exclusive)`
/// into a node-local ordering of the examples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval1D {
    /// First index covered by the interval.
    pub from_inclusive: usize,
    /// One past the last index covered by the interval.
    pub to_exclusive: usize,
}


impl Interval1D {
    /// Construct a new interval `[from_inclusive, to_exclusive)`.
    #[inline]
    pub fn new(from_inclusive: usize, to_exclusive: usize) -> Self {
        Self { from_inclusive, to_exclusive }
    }


    /// Returns the number of indices covered by the interval.
    #[inline]
    pub fn len(&self) -> usize {
        self.to_exclusive.saturating_sub(self.from_inclusive)
    }


    /// Returns `true` if the interval covers no index.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /// Returns the interval as a `Range`.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.from_inclusive..self.to_exclusive
    }


    /// Split the interval at `position` into `[from, position)`
    /// and `[position, to)`.
    #[inline]
    pub fn split_at(&self, position: usize) -> (Self, Self) {
        let position = position.clamp(self.from_inclusive, self.to_exclusive);
        let left = Self::new(self.from_inclusive, position);
        let right = Self::new(position, self.to_exclusive);
        (left, right)
    }


    /// Check that the interval is ordered and fits in data of length `len`.
    #[inline]
    pub(crate) fn check(&self, len: usize) -> Result<()> {
        if self.from_inclusive > self.to_exclusive || self.to_exclusive > len {
            return Err(TreeError::InvalidInterval {
                from: self.from_inclusive,
                to: self.to_exclusive,
                len,
            });
        }
        Ok(())
    }
}


impl From<Range<usize>> for Interval1D {
    #[inline]
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}


impl fmt::Display for Interval1D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from_inclusive, self.to_exclusive)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_01() {
        let interval = Interval1D::new(2, 8);
        let res = interval.split_at(5);
        let exp = (Interval1D::new(2, 5), Interval1D::new(5, 8));
        assert_eq!(exp, res, "expected {exp:?}, got {res:?}.");
    }

    #[test]
    fn test_check_01() {
        assert!(Interval1D::new(0, 4).check(4).is_ok());
        assert!(Interval1D::new(0, 5).check(4).is_err());
        assert!(Interval1D::new(3, 2).check(4).is_err());
    }

    #[test]
    fn test_len_01() {
        let interval = Interval1D::from(3..7);
        assert_eq!(4, interval.len());
        assert!(!interval.is_empty());
        assert!(Interval1D::new(3, 3).is_empty());
    }
}
