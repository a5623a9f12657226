//! A dense, row-major matrix of `f64` observations.
use serde::{Serialize, Deserialize};

use std::fmt;
use std::ops::Index;

use crate::error::{Result, TreeError};


/// Observation matrix.
/// Row `i` holds the feature values of the `i`-th example.
///
/// Learners borrow the matrix immutably for the duration of a call,
/// so all access goes through bounds-checked slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct F64Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}


impl F64Matrix {
    /// Construct a matrix from a row-major buffer.
    /// Returns `Err` if `data.len() != rows * cols`.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        let expected = rows * cols;
        if data.len() != expected {
            return Err(TreeError::LengthMismatch {
                what: "matrix data",
                expected,
                got: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }


    /// Construct a matrix from a slice of rows.
    /// All rows must have the same length.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self>
        where R: AsRef<[f64]>,
    {
        let n_rows = rows.len();
        let n_cols = rows.first()
            .map(|row| row.as_ref().len())
            .unwrap_or(0);

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n_cols {
                return Err(TreeError::RaggedRows {
                    row: i,
                    expected: n_cols,
                    got: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self { data, rows: n_rows, cols: n_cols })
    }


    /// Returns the number of rows (examples).
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows
    }


    /// Returns the number of columns (features).
    #[inline]
    pub fn column_count(&self) -> usize {
        self.cols
    }


    /// Returns `(row_count, column_count)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }


    /// Returns the value at `(row, col)`.
    ///
    /// # Panics
    /// Panics if `row` or `col` is out of range.
    #[inline(always)]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        assert!(col < self.cols, "column {col} is out of range");
        self.data[row * self.cols + col]
    }


    /// Returns the `row`-th example as a slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }


    /// Iterates over the rows of the matrix.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }


    /// Copies the `col`-th feature into a new vector.
    pub fn column(&self, col: usize) -> Vec<f64> {
        assert!(col < self.cols, "column {col} is out of range");
        (0..self.rows).map(|i| self.data[i * self.cols + col])
            .collect()
    }
}


impl Index<(usize, usize)> for F64Matrix {
    type Output = f64;
    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(col < self.cols, "column {col} is out of range");
        &self.data[row * self.cols + col]
    }
}


impl fmt::Display for F64Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "F64Matrix ({} x {})", self.rows, self.cols)?;
        for row in self.rows() {
            let line = row.iter()
                .map(|v| format!("{v:>10.4}"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
