//! MCDM module - Multi-criteria decision engines.
//!
//! Contains the three engines and their shared building blocks:
//! - `AhpAnalyzer` - Priority weights and consistency from pairwise judgments
//! - `TopsisAnalyzer` - Ranking by closeness to the ideal solution
//! - `DeaAnalyzer` - CCR efficiency via linear programming
//!
//! All engines are stateless; every operation is a pure function of its inputs.

mod ahp;
mod comparison_matrix;
mod dea;
pub mod lp;
mod matrix;
mod topsis;

pub use ahp::{
    random_index, AhpAnalyzer, ConsistencyReport, JudgmentVariation, PriorityWeights,
    SensitivityReport, CONSISTENCY_THRESHOLD, RANDOM_INDEX,
};
pub use comparison_matrix::{ComparisonMatrix, Judgment};
pub use dea::{
    DeaAnalyzer, DeaResult, DeaSolution, DeaStatus, DeaSweep, ImprovementTarget,
    TargetAdjustment, FRONTIER_TOLERANCE, PEER_THRESHOLD,
};
pub use matrix::{matrix_from_rows, matrix_to_rows};
pub use topsis::{TopsisAnalyzer, TopsisResult, TopsisSensitivity, WeightVariation};
