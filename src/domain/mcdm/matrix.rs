//! Matrix helpers shared by the TOPSIS and DEA engines.

use nalgebra::DMatrix;

use crate::domain::foundation::AnalysisError;

/// Builds a matrix from row-major nested vectors.
///
/// # Errors
/// - no rows, or rows with no columns
/// - rows of differing length
pub fn matrix_from_rows(field: &str, rows: &[Vec<f64>]) -> Result<DMatrix<f64>, AnalysisError> {
    let nrows = rows.len();
    let ncols = rows.first().map(Vec::len).unwrap_or(0);
    if nrows == 0 || ncols == 0 {
        return Err(AnalysisError::empty_field(field));
    }
    if let Some((r, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != ncols) {
        return Err(AnalysisError::dimension_mismatch(
            format!("{field} row {r}"),
            ncols,
            row.len(),
        ));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(DMatrix::from_row_slice(nrows, ncols, &flat))
}

/// Converts a matrix back to row-major nested vectors.
pub fn matrix_to_rows(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect()
}

/// Fails on an empty matrix or any non-finite entry.
pub(crate) fn ensure_finite(field: &str, matrix: &DMatrix<f64>) -> Result<(), AnalysisError> {
    if matrix.is_empty() {
        return Err(AnalysisError::empty_field(field));
    }
    for ((row, col), v) in indexed(matrix) {
        if !v.is_finite() {
            return Err(AnalysisError::NonFiniteValue {
                field: field.to_string(),
                row,
                col,
            });
        }
    }
    Ok(())
}

/// Fails on an empty matrix or any entry that is not strictly positive and finite.
pub(crate) fn ensure_positive(field: &str, matrix: &DMatrix<f64>) -> Result<(), AnalysisError> {
    ensure_finite(field, matrix)?;
    for ((row, col), v) in indexed(matrix) {
        if v <= 0.0 {
            return Err(AnalysisError::non_positive(field, row, col, v));
        }
    }
    Ok(())
}

fn indexed(matrix: &DMatrix<f64>) -> impl Iterator<Item = ((usize, usize), f64)> + '_ {
    (0..matrix.nrows()).flat_map(move |r| (0..matrix.ncols()).map(move |c| ((r, c), matrix[(r, c)])))
}

/// Default labels `{prefix}_{i}` for `count` items.
pub(crate) fn default_names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}_{i}")).collect()
}

/// Indices ordered by descending score. Ties keep index order.
pub(crate) fn descending_order(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}
