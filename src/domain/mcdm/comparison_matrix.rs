//! Comparison Matrix - Reciprocal pairwise judgments for AHP.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::AnalysisError;

/// Relative tolerance for `a[i][j] * a[j][i] == 1` on externally supplied matrices.
/// Loose enough to accept reciprocals rounded to three decimals (1/3 ~ 0.333).
const RECIPROCAL_TOLERANCE: f64 = 1e-2;

/// A single pairwise judgment: criterion `i` is `value` times as important as `j`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub i: usize,
    pub j: usize,
    pub value: f64,
}

impl Judgment {
    /// Creates a new judgment.
    pub fn new(i: usize, j: usize, value: f64) -> Self {
        Self { i, j, value }
    }
}

/// A positive reciprocal n×n matrix with unit diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMatrix {
    values: DMatrix<f64>,
}

impl ComparisonMatrix {
    /// Builds a matrix from sparse judgments.
    ///
    /// Each judgment sets `(i, j)` and its reciprocal `(j, i)`; unspecified
    /// pairs stay at 1 (equal importance). A later judgment on the same pair,
    /// in either order, overrides an earlier one.
    ///
    /// # Errors
    /// - `n == 0`
    /// - index out of range, or `i == j`
    /// - ratio that is zero, negative, or non-finite
    pub fn from_judgments<I>(judgments: I, n: usize) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = ((usize, usize), f64)>,
    {
        if n == 0 {
            return Err(AnalysisError::empty_field("comparison_matrix"));
        }

        let mut values = DMatrix::from_element(n, n, 1.0);
        for ((i, j), value) in judgments {
            Self::check_judgment(i, j, value, n)?;
            values[(i, j)] = value;
            values[(j, i)] = 1.0 / value;
        }

        Ok(Self { values })
    }

    /// Wraps a full matrix after checking the reciprocal invariants.
    ///
    /// # Errors
    /// - empty or non-square matrix
    /// - non-finite or non-positive entries
    /// - diagonal entries other than 1, or broken reciprocal symmetry
    pub fn from_matrix(values: DMatrix<f64>) -> Result<Self, AnalysisError> {
        let n = values.nrows();
        if n == 0 {
            return Err(AnalysisError::empty_field("comparison_matrix"));
        }
        if values.ncols() != n {
            return Err(AnalysisError::dimension_mismatch(
                "comparison_matrix",
                format!("{n}x{n}"),
                format!("{}x{}", n, values.ncols()),
            ));
        }

        for i in 0..n {
            for j in 0..n {
                let v = values[(i, j)];
                if !v.is_finite() {
                    return Err(AnalysisError::NonFiniteValue {
                        field: "comparison_matrix".to_string(),
                        row: i,
                        col: j,
                    });
                }
                if v <= 0.0 {
                    return Err(AnalysisError::non_positive("comparison_matrix", i, j, v));
                }
            }
        }

        for i in 0..n {
            if (values[(i, i)] - 1.0).abs() > RECIPROCAL_TOLERANCE {
                return Err(AnalysisError::invalid_judgment(
                    i,
                    i,
                    values[(i, i)],
                    "diagonal entries must be 1",
                ));
            }
            for j in (i + 1)..n {
                let product = values[(i, j)] * values[(j, i)];
                if (product - 1.0).abs() > RECIPROCAL_TOLERANCE {
                    return Err(AnalysisError::invalid_judgment(
                        i,
                        j,
                        values[(i, j)],
                        format!("reciprocal ({j}, {i}) = {} does not match", values[(j, i)]),
                    ));
                }
            }
        }

        Ok(Self { values })
    }

    /// Builds from row-major nested vectors, as read from problem files.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, AnalysisError> {
        let n = rows.len();
        if let Some((r, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(AnalysisError::dimension_mismatch(
                format!("comparison_matrix row {r}"),
                n,
                row.len(),
            ));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::from_matrix(DMatrix::from_row_slice(n, n, &flat))
    }

    /// Returns a copy with judgment `(i, j)` replaced and its reciprocal re-derived.
    pub fn with_judgment(&self, i: usize, j: usize, value: f64) -> Result<Self, AnalysisError> {
        Self::check_judgment(i, j, value, self.size())?;
        let mut values = self.values.clone();
        values[(i, j)] = value;
        values[(j, i)] = 1.0 / value;
        Ok(Self { values })
    }

    fn check_judgment(i: usize, j: usize, value: f64, n: usize) -> Result<(), AnalysisError> {
        if i >= n {
            return Err(AnalysisError::index_out_of_range("criterion", i, n));
        }
        if j >= n {
            return Err(AnalysisError::index_out_of_range("criterion", j, n));
        }
        if i == j {
            return Err(AnalysisError::invalid_judgment(
                i,
                j,
                value,
                "a criterion cannot be compared with itself",
            ));
        }
        if !value.is_finite() || value <= 0.0 {
            return Err(AnalysisError::invalid_judgment(
                i,
                j,
                value,
                "ratio must be strictly positive and finite",
            ));
        }
        Ok(())
    }

    /// Returns the number of criteria.
    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    /// Returns entry `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    /// Returns the underlying matrix.
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Returns the matrix as row-major nested vectors.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.size())
            .map(|i| self.values.row(i).iter().copied().collect())
            .collect()
    }
}
