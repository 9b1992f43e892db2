//! AHP Analyzer - Eigenvector priority weights, consistency ratio, and judgment sensitivity.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ComparisonMatrix;
use crate::domain::foundation::{AnalysisError, Perturbation};

/// Saaty's Random Index for matrix sizes 1 through 10.
pub const RANDOM_INDEX: [f64; 10] = [0.00, 0.00, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49];

/// Judgments are consistent when CR is strictly below this value.
pub const CONSISTENCY_THRESHOLD: f64 = 0.10;

/// Random Index for an n×n matrix. Sizes above 10 reuse the n = 10 value.
pub fn random_index(n: usize) -> f64 {
    match n {
        0 => 0.0,
        _ => RANDOM_INDEX
            .get(n - 1)
            .copied()
            .unwrap_or(RANDOM_INDEX[RANDOM_INDEX.len() - 1]),
    }
}

/// Principal eigenvector weights with λ_max and the consistency index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityWeights {
    pub weights: Vec<f64>,
    pub lambda_max: f64,
    pub ci: f64,
}

/// Full consistency analysis of a comparison matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub weights: Vec<f64>,
    pub lambda_max: f64,
    pub ci: f64,
    pub ri: f64,
    pub cr: f64,
    pub is_consistent: bool,
    pub message: String,
}

impl ConsistencyReport {
    /// Criterion indices ordered by descending weight (ties keep index order).
    pub fn priority_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.weights.len()).collect();
        order.sort_by(|&a, &b| self.weights[b].total_cmp(&self.weights[a]));
        order
    }
}

/// Result of perturbing one judgment in one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentVariation {
    pub pair: (usize, usize),
    pub direction: Perturbation,
    pub factor: f64,
    pub new_value: f64,
    pub weights: Vec<f64>,
    pub weight_change: Vec<f64>,
    pub cr: f64,
    pub is_consistent: bool,
}

impl JudgmentVariation {
    /// Short key such as `(0,1)_x0.75`.
    pub fn key(&self) -> String {
        format!("({},{})_x{:.2}", self.pair.0, self.pair.1, self.factor)
    }

    /// Largest absolute weight movement across criteria.
    pub fn max_abs_change(&self) -> f64 {
        self.weight_change.iter().fold(0.0, |acc, d| acc.max(d.abs()))
    }
}

/// Sensitivity of AHP weights to perturbed judgments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub base_weights: Vec<f64>,
    pub variation: f64,
    pub variations: Vec<JudgmentVariation>,
}

/// Analytic Hierarchy Process functions.
pub struct AhpAnalyzer;

impl AhpAnalyzer {
    /// Builds a comparison matrix from sparse judgments.
    ///
    /// See [`ComparisonMatrix::from_judgments`].
    pub fn build_matrix<I>(judgments: I, n: usize) -> Result<ComparisonMatrix, AnalysisError>
    where
        I: IntoIterator<Item = ((usize, usize), f64)>,
    {
        ComparisonMatrix::from_judgments(judgments, n)
    }

    /// Computes priority weights by the eigenvector method.
    ///
    /// # Algorithm
    /// 1. Complex eigenvalues of the (non-symmetric) matrix; λ_max is the one
    ///    with the largest real part.
    /// 2. Eigenvector of λ_max as the null space of `A - λ_max·I` (SVD, smallest
    ///    singular value), imaginary parts discarded.
    /// 3. Normalize to sum 1; negate if any entry is negative.
    /// 4. CI = (λ_max − n)/(n − 1), or 0 when n ≤ 2.
    ///
    /// # Edge Cases
    /// - 1×1 matrix: weight `[1.0]`, CI 0
    /// - Degenerate eigenvector summing to 0: falls back to equal weights
    pub fn weights(matrix: &ComparisonMatrix) -> PriorityWeights {
        let n = matrix.size();
        let a = matrix.as_matrix();

        let lambda_max = a
            .complex_eigenvalues()
            .iter()
            .map(|c| c.re)
            .fold(f64::NEG_INFINITY, f64::max);

        let weights = match Self::principal_eigenvector(a, lambda_max) {
            Some(v) => Self::normalize_eigenvector(v),
            None => None,
        }
        .unwrap_or_else(|| {
            warn!(n, "Principal eigenvector degenerate, using equal weights");
            vec![1.0 / n as f64; n]
        });

        let ci = if n > 2 {
            (lambda_max - n as f64) / (n as f64 - 1.0)
        } else {
            0.0
        };

        PriorityWeights {
            weights,
            lambda_max,
            ci,
        }
    }

    fn principal_eigenvector(a: &DMatrix<f64>, lambda_max: f64) -> Option<DVector<f64>> {
        let n = a.nrows();
        let shifted = a - DMatrix::identity(n, n) * lambda_max;
        let svd = shifted.svd(false, true);
        let v_t = svd.v_t?;

        let (smallest, _) = svd
            .singular_values
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |(best, best_value), (idx, &s)| {
                if s < best_value {
                    (idx, s)
                } else {
                    (best, best_value)
                }
            });

        Some(v_t.row(smallest).transpose())
    }

    /// Flips the vector to the non-negative orthant, zeroes leftover negative
    /// noise, then scales to sum 1.
    fn normalize_eigenvector(mut v: DVector<f64>) -> Option<Vec<f64>> {
        if v.sum() < 0.0 {
            v.neg_mut();
        }
        v.iter_mut().filter(|x| **x < 0.0).for_each(|x| *x = 0.0);

        let sum = v.sum();
        if !sum.is_finite() || sum < f64::EPSILON {
            return None;
        }
        Some(v.iter().map(|x| x / sum).collect())
    }

    /// Computes weights together with RI, CR and the consistency verdict.
    ///
    /// CR < 0.10 is consistent. An inconsistent matrix is a valid outcome,
    /// reported through `is_consistent` and `message`, never as an error.
    pub fn weights_and_consistency(matrix: &ComparisonMatrix) -> ConsistencyReport {
        let n = matrix.size();
        let PriorityWeights {
            weights,
            lambda_max,
            ci,
        } = Self::weights(matrix);

        let ri = random_index(n);
        let cr = if ri > 0.0 { ci / ri } else { 0.0 };
        let is_consistent = cr < CONSISTENCY_THRESHOLD;

        let message = if is_consistent {
            format!("Consistent (CR={:.4} < 0.10)", cr)
        } else {
            format!("INCONSISTENT! CR={:.4} >= 0.10. Revise judgments.", cr)
        };

        if is_consistent {
            debug!(n, lambda_max, cr, "AHP judgments consistent");
        } else {
            warn!(n, lambda_max, cr, "AHP judgments inconsistent");
        }

        ConsistencyReport {
            weights,
            lambda_max,
            ci,
            ri,
            cr,
            is_consistent,
            message,
        }
    }

    /// Perturbs each listed judgment by `±variation` and recomputes consistency.
    ///
    /// For every pair, two copies of the matrix are made (`value × (1 − v)` and
    /// `value × (1 + v)`), each with its reciprocal re-derived. The input matrix
    /// is never modified.
    ///
    /// # Errors
    /// - `variation` outside `[0, 1)`
    /// - a pair with out-of-range indices or `i == j`
    pub fn sensitivity(
        matrix: &ComparisonMatrix,
        pairs: &[(usize, usize)],
        variation: f64,
    ) -> Result<SensitivityReport, AnalysisError> {
        if !variation.is_finite() || !(0.0..1.0).contains(&variation) {
            return Err(AnalysisError::out_of_range("variation", 0.0, 1.0, variation));
        }

        let base_weights = Self::weights_and_consistency(matrix).weights;
        let mut variations = Vec::with_capacity(pairs.len() * 2);

        for &(i, j) in pairs {
            let n = matrix.size();
            if i >= n || j >= n {
                return Err(AnalysisError::index_out_of_range("criterion", i.max(j), n));
            }
            let original = matrix.get(i, j);

            for direction in Perturbation::BOTH {
                let factor = direction.factor(variation);
                let new_value = original * factor;
                let varied = matrix.with_judgment(i, j, new_value)?;
                let report = Self::weights_and_consistency(&varied);

                let weight_change = report
                    .weights
                    .iter()
                    .zip(&base_weights)
                    .map(|(w, b)| w - b)
                    .collect();

                variations.push(JudgmentVariation {
                    pair: (i, j),
                    direction,
                    factor,
                    new_value,
                    weights: report.weights,
                    weight_change,
                    cr: report.cr,
                    is_consistent: report.is_consistent,
                });
            }
        }

        Ok(SensitivityReport {
            base_weights,
            variation,
            variations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known_example() -> ComparisonMatrix {
        AhpAnalyzer::build_matrix(
            [
                ((0, 1), 2.0),
                ((0, 2), 1.0),
                ((0, 3), 5.0),
                ((1, 2), 0.5),
                ((1, 3), 3.0),
                ((2, 3), 4.0),
            ],
            4,
        )
        .unwrap()
    }

    fn sum(v: &[f64]) -> f64 {
        v.iter().sum()
    }

    // Random Index Tests

    #[test]
    fn random_index_matches_saaty_table() {
        assert_eq!(random_index(1), 0.00);
        assert_eq!(random_index(2), 0.00);
        assert_eq!(random_index(3), 0.58);
        assert_eq!(random_index(4), 0.90);
        assert_eq!(random_index(10), 1.49);
    }

    #[test]
    fn random_index_beyond_ten_reuses_last_value() {
        assert_eq!(random_index(11), 1.49);
        assert_eq!(random_index(25), 1.49);
    }

    // Weight Tests

    #[test]
    fn identity_judgments_give_equal_weights() {
        let m = AhpAnalyzer::build_matrix(Vec::new(), 5).unwrap();
        let report = AhpAnalyzer::weights_and_consistency(&m);

        for w in &report.weights {
            assert!((w - 0.2).abs() < 1e-9);
        }
        assert!((report.lambda_max - 5.0).abs() < 1e-9);
        assert!(report.ci.abs() < 1e-9);
        assert!(report.cr.abs() < 1e-9);
        assert!(report.is_consistent);
    }

    #[test]
    fn eigenvector_sign_is_fixed_before_normalizing() {
        let flipped = DVector::from_vec(vec![-0.6, -0.3, -0.1]);
        let weights = AhpAnalyzer::normalize_eigenvector(flipped).unwrap();
        assert!((weights[0] - 0.6).abs() < 1e-12);
        assert!((weights[2] - 0.1).abs() < 1e-12);

        let noisy = DVector::from_vec(vec![-0.5, -0.5, 1e-17]);
        let weights = AhpAnalyzer::normalize_eigenvector(noisy).unwrap();
        assert!(weights.iter().all(|&w| w >= 0.0), "{weights:?}");
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(weights[2], 0.0);
    }

    #[test]
    fn single_criterion_has_full_weight() {
        let m = AhpAnalyzer::build_matrix(Vec::new(), 1).unwrap();
        let pw = AhpAnalyzer::weights(&m);
        assert!((pw.weights[0] - 1.0).abs() < 1e-12);
        assert_eq!(pw.ci, 0.0);
    }

    #[test]
    fn two_criteria_follow_the_ratio() {
        let m = AhpAnalyzer::build_matrix([((0, 1), 3.0)], 2).unwrap();
        let report = AhpAnalyzer::weights_and_consistency(&m);

        assert!((report.weights[0] - 0.75).abs() < 1e-9);
        assert!((report.weights[1] - 0.25).abs() < 1e-9);
        assert_eq!(report.ci, 0.0);
        assert_eq!(report.cr, 0.0);
        assert!(report.is_consistent);
    }

    #[test]
    fn perfectly_consistent_matrix_recovers_weights() {
        // Weights 0.5, 0.3, 0.2 give a_ij = w_i / w_j.
        let w = [0.5, 0.3, 0.2];
        let m = AhpAnalyzer::build_matrix(
            [
                ((0, 1), w[0] / w[1]),
                ((0, 2), w[0] / w[2]),
                ((1, 2), w[1] / w[2]),
            ],
            3,
        )
        .unwrap();
        let report = AhpAnalyzer::weights_and_consistency(&m);

        for (got, want) in report.weights.iter().zip(w) {
            assert!((got - want).abs() < 1e-9);
        }
        assert!(report.cr.abs() < 1e-9);
    }

    #[test]
    fn known_example_is_consistent_and_ordered() {
        let report = AhpAnalyzer::weights_and_consistency(&known_example());
        let w = &report.weights;

        assert!(report.cr < CONSISTENCY_THRESHOLD, "CR was {}", report.cr);
        assert!(report.is_consistent);
        assert!((sum(w) - 1.0).abs() < 1e-9);
        assert!(w[0] > w[2] && w[2] > w[1] && w[1] > w[3], "weights {:?}", w);
        assert_eq!(report.priority_order(), vec![0, 2, 1, 3]);
        assert!(report.message.starts_with("Consistent (CR="));
        assert_eq!(report.ri, 0.90);
    }

    #[test]
    fn lambda_max_is_at_least_n_for_reciprocal_matrices() {
        let report = AhpAnalyzer::weights_and_consistency(&known_example());
        assert!(report.lambda_max >= 4.0 - 1e-9);
        assert!(report.ci >= -1e-9);
    }

    #[test]
    fn contradictory_judgments_are_flagged_not_rejected() {
        // A > B strongly, B > C strongly, but C > A strongly.
        let m = AhpAnalyzer::build_matrix([((0, 1), 9.0), ((1, 2), 9.0), ((0, 2), 1.0 / 9.0)], 3)
            .unwrap();
        let report = AhpAnalyzer::weights_and_consistency(&m);

        assert!(!report.is_consistent);
        assert!(report.cr >= CONSISTENCY_THRESHOLD);
        assert!(report.message.starts_with("INCONSISTENT!"));
        assert!(report.message.contains("Revise judgments"));
        assert!((sum(&report.weights) - 1.0).abs() < 1e-9);
        assert!(report.weights.iter().all(|&w| w >= 0.0));
    }

    #[test]
    fn increasing_a_judgment_shifts_weight_toward_dominant_criterion() {
        let base = known_example();
        let stronger = base.with_judgment(0, 3, 7.0).unwrap();

        let w0 = AhpAnalyzer::weights(&base).weights;
        let w1 = AhpAnalyzer::weights(&stronger).weights;

        assert!(w1[0] >= w0[0]);
        assert!(w1[3] <= w0[3]);
    }

    // Sensitivity Tests

    #[test]
    fn sensitivity_produces_two_variations_per_pair() {
        let report = AhpAnalyzer::sensitivity(&known_example(), &[(0, 1), (0, 2), (1, 2)], 0.25)
            .unwrap();

        assert_eq!(report.variations.len(), 6);
        assert_eq!(report.variations[0].key(), "(0,1)_x0.75");
        assert_eq!(report.variations[1].key(), "(0,1)_x1.25");
        assert!((report.variations[1].new_value - 2.5).abs() < 1e-12);
        for v in &report.variations {
            assert!((sum(&v.weights) - 1.0).abs() < 1e-9);
            let delta: f64 = v.weight_change.iter().sum();
            assert!(delta.abs() < 1e-9);
        }
    }

    #[test]
    fn sensitivity_does_not_mutate_base_matrix() {
        let base = known_example();
        let before = base.clone();
        AhpAnalyzer::sensitivity(&base, &[(0, 3)], 0.5).unwrap();
        assert_eq!(base, before);
    }

    #[test]
    fn dominant_judgment_moves_weights_more_than_negligible_one() {
        // Criterion 0 dominates; criteria 2 and 3 are nearly irrelevant and
        // compared equally with each other.
        let m = AhpAnalyzer::build_matrix(
            [
                ((0, 1), 5.0),
                ((0, 2), 9.0),
                ((0, 3), 9.0),
                ((1, 2), 3.0),
                ((1, 3), 3.0),
                ((2, 3), 1.0),
            ],
            4,
        )
        .unwrap();
        let report = AhpAnalyzer::sensitivity(&m, &[(0, 1), (2, 3)], 0.25).unwrap();

        let dominant = report.variations[1].max_abs_change();
        let negligible = report.variations[3].max_abs_change();
        assert!(dominant > 0.01, "dominant change {dominant}");
        assert!(negligible < dominant, "{negligible} vs {dominant}");
    }

    #[test]
    fn sensitivity_rejects_bad_variation() {
        let m = known_example();
        assert!(AhpAnalyzer::sensitivity(&m, &[(0, 1)], 1.0).is_err());
        assert!(AhpAnalyzer::sensitivity(&m, &[(0, 1)], -0.1).is_err());
    }

    #[test]
    fn sensitivity_rejects_bad_pair() {
        let m = known_example();
        assert!(AhpAnalyzer::sensitivity(&m, &[(0, 4)], 0.2).is_err());
        assert!(AhpAnalyzer::sensitivity(&m, &[(2, 2)], 0.2).is_err());
    }
}
