//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors raised at the boundary of the decision engines.
///
/// Malformed input always fails fast with one of these. Numerical
/// degeneracy, inconsistent AHP judgments and LP failures inside a DEA
/// sweep are reported as data instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Field '{field}' must be strictly positive, got {value} at ({row}, {col})")]
    NonPositiveValue {
        field: String,
        row: usize,
        col: usize,
        value: f64,
    },

    #[error("Field '{field}' contains a non-finite value at ({row}, {col})")]
    NonFiniteValue { field: String, row: usize, col: usize },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Index {index} is out of range for '{field}' of length {len}")]
    IndexOutOfRange {
        field: String,
        index: usize,
        len: usize,
    },

    #[error("Invalid judgment ({i}, {j}) = {value}: {reason}")]
    InvalidJudgment {
        i: usize,
        j: usize,
        value: f64,
        reason: String,
    },

    #[error("Unknown criterion type '{0}' (expected 'benefit' or 'cost')")]
    UnknownCriterionType(String),

    #[error("Unknown orientation '{0}' (expected 'input' or 'output')")]
    UnknownOrientation(String),

    #[error("Unknown plan '{0}'")]
    UnknownPlan(String),

    #[error("Problem file error: {0}")]
    ProblemFile(String),
}

impl AnalysisError {
    /// Creates an empty field error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        AnalysisError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates a dimension mismatch error.
    pub fn dimension_mismatch(
        field: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        AnalysisError::DimensionMismatch {
            field: field.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Creates a non-positive value error.
    pub fn non_positive(field: impl Into<String>, row: usize, col: usize, value: f64) -> Self {
        AnalysisError::NonPositiveValue {
            field: field.into(),
            row,
            col,
            value,
        }
    }

    /// Creates an out of range error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        AnalysisError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an index out of range error.
    pub fn index_out_of_range(field: impl Into<String>, index: usize, len: usize) -> Self {
        AnalysisError::IndexOutOfRange {
            field: field.into(),
            index,
            len,
        }
    }

    /// Creates an invalid judgment error.
    pub fn invalid_judgment(i: usize, j: usize, value: f64, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidJudgment {
            i,
            j,
            value,
            reason: reason.into(),
        }
    }

    /// Returns the stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::EmptyField { .. } => ErrorCode::EmptyField,
            AnalysisError::DimensionMismatch { .. } => ErrorCode::DimensionMismatch,
            AnalysisError::NonPositiveValue { .. } => ErrorCode::NonPositiveValue,
            AnalysisError::NonFiniteValue { .. } => ErrorCode::NonFiniteValue,
            AnalysisError::OutOfRange { .. } => ErrorCode::OutOfRange,
            AnalysisError::IndexOutOfRange { .. } => ErrorCode::OutOfRange,
            AnalysisError::InvalidJudgment { .. } => ErrorCode::InvalidJudgment,
            AnalysisError::UnknownCriterionType(_) => ErrorCode::UnknownCriterionType,
            AnalysisError::UnknownOrientation(_) => ErrorCode::UnknownOrientation,
            AnalysisError::UnknownPlan(_) => ErrorCode::UnknownPlan,
            AnalysisError::ProblemFile(_) => ErrorCode::ProblemFile,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    EmptyField,
    DimensionMismatch,
    NonPositiveValue,
    NonFiniteValue,
    OutOfRange,
    InvalidJudgment,
    UnknownCriterionType,
    UnknownOrientation,

    // Input errors
    UnknownPlan,
    ProblemFile,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::DimensionMismatch => "DIMENSION_MISMATCH",
            ErrorCode::NonPositiveValue => "NON_POSITIVE_VALUE",
            ErrorCode::NonFiniteValue => "NON_FINITE_VALUE",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidJudgment => "INVALID_JUDGMENT",
            ErrorCode::UnknownCriterionType => "UNKNOWN_CRITERION_TYPE",
            ErrorCode::UnknownOrientation => "UNKNOWN_ORIENTATION",
            ErrorCode::UnknownPlan => "UNKNOWN_PLAN",
            ErrorCode::ProblemFile => "PROBLEM_FILE",
        };
        write!(f, "{}", s)
    }
}
