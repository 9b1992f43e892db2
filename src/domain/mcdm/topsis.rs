//! TOPSIS Analyzer - Ranks alternatives by relative closeness to the ideal solution.
//!
//! Steps: vector-normalize each criterion column, multiply by weights, take
//! the best and worst value per criterion (respecting benefit/cost direction),
//! measure each alternative's Euclidean distance to both, and score
//! `C* = S⁻ / (S⁺ + S⁻)`.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::matrix::{default_names, descending_order, ensure_finite};
use crate::domain::foundation::{AnalysisError, CriterionType, Perturbation};

/// Weight sums within this distance of 1 are used as-is.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-8 + 1e-5;

/// Complete TOPSIS output for one decision matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopsisResult {
    /// Weights actually applied (renormalized when needed).
    pub weights: Vec<f64>,
    pub normalized: DMatrix<f64>,
    pub weighted: DMatrix<f64>,
    pub ideal: Vec<f64>,
    pub negative_ideal: Vec<f64>,
    pub s_plus: Vec<f64>,
    pub s_minus: Vec<f64>,
    pub closeness: Vec<f64>,
    /// Alternative indices, best first.
    pub ranking: Vec<usize>,
    pub ranked_names: Vec<String>,
    pub ranked_scores: Vec<f64>,
}

impl TopsisResult {
    /// Name of the top-ranked alternative.
    pub fn best(&self) -> Option<&str> {
        self.ranked_names.first().map(String::as_str)
    }
}

/// Ranking after one criterion weight was perturbed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVariation {
    pub criterion: usize,
    pub direction: Perturbation,
    pub weights: Vec<f64>,
    pub ranked_names: Vec<String>,
    pub ranked_scores: Vec<f64>,
    pub ranking_changed: bool,
}

impl WeightVariation {
    /// Short key such as `C2_increase`.
    pub fn key(&self) -> String {
        format!("C{}_{}", self.criterion, self.direction.as_str())
    }
}

/// Rank stability under ±variation on each criterion weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopsisSensitivity {
    pub variation: f64,
    pub base_ranking: Vec<String>,
    pub base_scores: Vec<f64>,
    pub variations: Vec<WeightVariation>,
}

impl TopsisSensitivity {
    /// True when no perturbation changed the ranking.
    pub fn is_stable(&self) -> bool {
        self.variations.iter().all(|v| !v.ranking_changed)
    }
}

/// TOPSIS functions.
pub struct TopsisAnalyzer;

impl TopsisAnalyzer {
    /// Divides each column by its Euclidean norm. A zero column stays zero.
    pub fn normalize(decision: &DMatrix<f64>) -> DMatrix<f64> {
        let mut normalized = decision.clone();
        for (j, mut column) in normalized.column_iter_mut().enumerate() {
            let norm = column.norm();
            if norm == 0.0 {
                debug!(criterion = j, "Zero-norm criterion column left unscaled");
                continue;
            }
            column /= norm;
        }
        normalized
    }

    /// Multiplies column j by `weights[j]`.
    pub fn apply_weights(
        normalized: &DMatrix<f64>,
        weights: &[f64],
    ) -> Result<DMatrix<f64>, AnalysisError> {
        if weights.len() != normalized.ncols() {
            return Err(AnalysisError::dimension_mismatch(
                "weights",
                normalized.ncols(),
                weights.len(),
            ));
        }
        let mut weighted = normalized.clone();
        for (mut column, &w) in weighted.column_iter_mut().zip(weights) {
            column *= w;
        }
        Ok(weighted)
    }

    /// Returns `(ideal, negative_ideal)`.
    ///
    /// Benefit criteria take the column max as ideal and min as negative
    /// ideal; cost criteria the reverse.
    pub fn ideal_solutions(
        weighted: &DMatrix<f64>,
        criteria: &[CriterionType],
    ) -> Result<(Vec<f64>, Vec<f64>), AnalysisError> {
        if criteria.len() != weighted.ncols() {
            return Err(AnalysisError::dimension_mismatch(
                "criteria_types",
                weighted.ncols(),
                criteria.len(),
            ));
        }
        if weighted.nrows() == 0 {
            return Err(AnalysisError::empty_field("decision_matrix"));
        }

        let (ideal, negative_ideal) = weighted
            .column_iter()
            .zip(criteria)
            .map(|(column, criterion)| {
                let (max, min) = (column.max(), column.min());
                if criterion.is_benefit() {
                    (max, min)
                } else {
                    (min, max)
                }
            })
            .unzip();
        Ok((ideal, negative_ideal))
    }

    /// Returns `(S⁺, S⁻)`: per-row Euclidean distances to the ideal and negative ideal.
    pub fn separation_measures(
        weighted: &DMatrix<f64>,
        ideal: &[f64],
        negative_ideal: &[f64],
    ) -> Result<(Vec<f64>, Vec<f64>), AnalysisError> {
        let n = weighted.ncols();
        if ideal.len() != n {
            return Err(AnalysisError::dimension_mismatch("ideal", n, ideal.len()));
        }
        if negative_ideal.len() != n {
            return Err(AnalysisError::dimension_mismatch(
                "negative_ideal",
                n,
                negative_ideal.len(),
            ));
        }

        let ideal = DVector::from_column_slice(ideal).transpose();
        let negative_ideal = DVector::from_column_slice(negative_ideal).transpose();
        Ok(weighted
            .row_iter()
            .map(|row| ((row - &ideal).norm(), (row - &negative_ideal).norm()))
            .unzip())
    }

    /// `C* = S⁻ / (S⁺ + S⁻)`. A zero denominator is treated as 1, giving 0.
    pub fn closeness_scores(s_plus: &[f64], s_minus: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        if s_plus.len() != s_minus.len() {
            return Err(AnalysisError::dimension_mismatch(
                "s_minus",
                s_plus.len(),
                s_minus.len(),
            ));
        }
        Ok(s_plus
            .iter()
            .zip(s_minus)
            .map(|(&plus, &minus)| {
                let denominator = plus + minus;
                let denominator = if denominator == 0.0 { 1.0 } else { denominator };
                minus / denominator
            })
            .collect())
    }

    /// Runs the full TOPSIS pipeline.
    ///
    /// Weights that do not sum to 1 are rescaled first. Ranking is by
    /// descending closeness; equal scores keep input order. Without names,
    /// alternatives are labelled `Alternative_{i}`.
    ///
    /// # Errors
    /// - empty or non-finite decision matrix
    /// - weights, criteria or names of the wrong length
    /// - negative or non-finite weights, or weights summing to zero
    pub fn rank(
        decision: &DMatrix<f64>,
        weights: &[f64],
        criteria: &[CriterionType],
        names: Option<&[String]>,
    ) -> Result<TopsisResult, AnalysisError> {
        ensure_finite("decision_matrix", decision)?;
        let (m, n) = decision.shape();
        if criteria.len() != n {
            return Err(AnalysisError::dimension_mismatch("criteria_types", n, criteria.len()));
        }
        let names = match names {
            Some(names) if names.len() != m => {
                return Err(AnalysisError::dimension_mismatch("alternative_names", m, names.len()))
            }
            Some(names) => names.to_vec(),
            None => default_names("Alternative", m),
        };
        let weights = Self::checked_weights(weights, n)?;

        let normalized = Self::normalize(decision);
        let weighted = Self::apply_weights(&normalized, &weights)?;
        let (ideal, negative_ideal) = Self::ideal_solutions(&weighted, criteria)?;
        let (s_plus, s_minus) = Self::separation_measures(&weighted, &ideal, &negative_ideal)?;
        let closeness = Self::closeness_scores(&s_plus, &s_minus)?;

        let ranking = descending_order(&closeness);
        let ranked_names = ranking.iter().map(|&i| names[i].clone()).collect();
        let ranked_scores: Vec<f64> = ranking.iter().map(|&i| closeness[i]).collect();

        debug!(
            alternatives = m,
            criteria = n,
            best = %names[ranking[0]],
            best_score = ranked_scores[0],
            "TOPSIS ranking computed"
        );

        Ok(TopsisResult {
            weights,
            normalized,
            weighted,
            ideal,
            negative_ideal,
            s_plus,
            s_minus,
            closeness,
            ranking,
            ranked_names,
            ranked_scores,
        })
    }

    fn checked_weights(weights: &[f64], n: usize) -> Result<Vec<f64>, AnalysisError> {
        if weights.len() != n {
            return Err(AnalysisError::dimension_mismatch("weights", n, weights.len()));
        }
        for (j, &w) in weights.iter().enumerate() {
            if !w.is_finite() {
                return Err(AnalysisError::NonFiniteValue {
                    field: "weights".to_string(),
                    row: 0,
                    col: j,
                });
            }
            if w < 0.0 {
                return Err(AnalysisError::out_of_range("weights", 0.0, 1.0, w));
            }
        }

        let sum: f64 = weights.iter().sum();
        if sum <= 0.0 {
            return Err(AnalysisError::out_of_range("weights sum", f64::MIN_POSITIVE, 1.0, sum));
        }
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            debug!(sum, "Renormalizing criterion weights");
            return Ok(weights.iter().map(|w| w / sum).collect());
        }
        Ok(weights.to_vec())
    }

    /// Re-ranks with each criterion weight scaled by `1 ± variation`.
    ///
    /// Each perturbed weight vector is renormalized before ranking. Variations
    /// are listed per criterion, increase first.
    pub fn weight_sensitivity(
        decision: &DMatrix<f64>,
        weights: &[f64],
        criteria: &[CriterionType],
        names: Option<&[String]>,
        variation: f64,
    ) -> Result<TopsisSensitivity, AnalysisError> {
        if !variation.is_finite() || !(0.0..1.0).contains(&variation) {
            return Err(AnalysisError::out_of_range("variation", 0.0, 1.0, variation));
        }

        let base = Self::rank(decision, weights, criteria, names)?;
        let mut variations = Vec::with_capacity(weights.len() * 2);

        for criterion in 0..base.weights.len() {
            for direction in [Perturbation::Increase, Perturbation::Decrease] {
                let mut varied = base.weights.clone();
                varied[criterion] *= direction.factor(variation);
                let sum: f64 = varied.iter().sum();
                varied.iter_mut().for_each(|w| *w /= sum);

                let result = Self::rank(decision, &varied, criteria, names)?;
                let ranking_changed = result.ranked_names != base.ranked_names;
                if ranking_changed {
                    warn!(
                        criterion,
                        direction = direction.verb(),
                        "TOPSIS ranking changed under weight perturbation"
                    );
                }

                variations.push(WeightVariation {
                    criterion,
                    direction,
                    weights: result.weights,
                    ranked_names: result.ranked_names,
                    ranked_scores: result.ranked_scores,
                    ranking_changed,
                });
            }
        }

        Ok(TopsisSensitivity {
            variation,
            base_ranking: base.ranked_names,
            base_scores: base.ranked_scores,
            variations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CriterionType::{Benefit, Cost};

    fn matrix(rows: usize, cols: usize, values: &[f64]) -> DMatrix<f64> {
        DMatrix::from_row_slice(rows, cols, values)
    }

    // Step Tests

    #[test]
    fn normalize_makes_unit_columns() {
        let n = TopsisAnalyzer::normalize(&matrix(2, 2, &[3.0, 1.0, 4.0, 1.0]));
        assert!((n[(0, 0)] - 0.6).abs() < 1e-12);
        assert!((n[(1, 0)] - 0.8).abs() < 1e-12);
        for column in n.column_iter() {
            assert!((column.norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn normalize_leaves_zero_column_at_zero() {
        let n = TopsisAnalyzer::normalize(&matrix(2, 2, &[0.0, 1.0, 0.0, 2.0]));
        assert_eq!(n[(0, 0)], 0.0);
        assert_eq!(n[(1, 0)], 0.0);
    }

    #[test]
    fn apply_weights_scales_columns() {
        let w = TopsisAnalyzer::apply_weights(&matrix(1, 2, &[0.5, 0.5]), &[0.2, 0.8]).unwrap();
        assert!((w[(0, 0)] - 0.1).abs() < 1e-12);
        assert!((w[(0, 1)] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn apply_weights_rejects_wrong_length() {
        assert!(TopsisAnalyzer::apply_weights(&matrix(1, 2, &[0.5, 0.5]), &[1.0]).is_err());
    }

    #[test]
    fn ideal_solutions_respect_direction() {
        let w = matrix(2, 2, &[0.1, 0.4, 0.3, 0.2]);
        let (ideal, negative) = TopsisAnalyzer::ideal_solutions(&w, &[Benefit, Cost]).unwrap();
        assert_eq!(ideal, vec![0.3, 0.2]);
        assert_eq!(negative, vec![0.1, 0.4]);
    }

    #[test]
    fn separation_measures_are_euclidean() {
        let w = matrix(1, 2, &[0.0, 0.0]);
        let (plus, minus) =
            TopsisAnalyzer::separation_measures(&w, &[3.0, 4.0], &[0.0, 0.0]).unwrap();
        assert!((plus[0] - 5.0).abs() < 1e-12);
        assert_eq!(minus[0], 0.0);
    }

    #[test]
    fn closeness_handles_zero_denominator() {
        let c = TopsisAnalyzer::closeness_scores(&[0.0, 1.0, 0.0], &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(c, vec![0.0, 0.5, 1.0]);
    }

    // Rank Tests

    #[test]
    fn dominating_alternative_scores_one_and_dominated_scores_zero() {
        let decision = matrix(3, 2, &[10.0, 1.0, 5.0, 5.0, 1.0, 10.0]);
        let result = TopsisAnalyzer::rank(&decision, &[0.5, 0.5], &[Benefit, Cost], None).unwrap();

        assert!((result.closeness[0] - 1.0).abs() < 1e-12);
        assert!(result.closeness[2].abs() < 1e-12);
        assert_eq!(result.ranking, vec![0, 1, 2]);
        assert_eq!(result.best(), Some("Alternative_0"));
    }

    #[test]
    fn closeness_stays_in_unit_interval() {
        let decision = matrix(3, 3, &[7.0, 9.0, 9.0, 8.0, 7.0, 8.0, 9.0, 6.0, 8.0]);
        let result =
            TopsisAnalyzer::rank(&decision, &[0.3, 0.3, 0.4], &[Benefit, Benefit, Cost], None)
                .unwrap();
        assert!(result.closeness.iter().all(|c| (0.0..=1.0).contains(c)));
        assert!(result.ranked_scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn unnormalized_weights_are_rescaled() {
        let decision = matrix(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let a = TopsisAnalyzer::rank(&decision, &[2.0, 6.0], &[Benefit, Benefit], None).unwrap();
        let b = TopsisAnalyzer::rank(&decision, &[0.25, 0.75], &[Benefit, Benefit], None).unwrap();

        assert!((a.weights[0] - 0.25).abs() < 1e-12);
        assert_eq!(a.ranking, b.ranking);
        for (x, y) in a.closeness.iter().zip(&b.closeness) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let decision = matrix(3, 1, &[1.0, 1.0, 1.0]);
        let result = TopsisAnalyzer::rank(&decision, &[1.0], &[Benefit], None).unwrap();
        assert_eq!(result.ranking, vec![0, 1, 2]);
    }

    #[test]
    fn uses_supplied_names() {
        let decision = matrix(2, 1, &[1.0, 2.0]);
        let names = vec!["Basic".to_string(), "Plus".to_string()];
        let result = TopsisAnalyzer::rank(&decision, &[1.0], &[Benefit], Some(names.as_slice())).unwrap();
        assert_eq!(result.ranked_names, vec!["Plus", "Basic"]);
    }

    #[test]
    fn rank_rejects_mismatched_shapes() {
        let decision = matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert!(TopsisAnalyzer::rank(&decision, &[1.0], &[Benefit, Cost], None).is_err());
        assert!(TopsisAnalyzer::rank(&decision, &[0.5, 0.5], &[Benefit], None).is_err());
        let names = vec!["only".to_string()];
        assert!(
            TopsisAnalyzer::rank(&decision, &[0.5, 0.5], &[Benefit, Cost], Some(names.as_slice())).is_err()
        );
    }

    #[test]
    fn rank_rejects_bad_weights() {
        let decision = matrix(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert!(TopsisAnalyzer::rank(&decision, &[-0.5, 1.5], &[Benefit, Cost], None).is_err());
        assert!(TopsisAnalyzer::rank(&decision, &[0.0, 0.0], &[Benefit, Cost], None).is_err());
    }

    // Sensitivity Tests

    #[test]
    fn weight_sensitivity_covers_each_criterion_both_ways() {
        let decision = matrix(3, 2, &[10.0, 1.0, 5.0, 5.0, 1.0, 10.0]);
        let s = TopsisAnalyzer::weight_sensitivity(
            &decision,
            &[0.5, 0.5],
            &[Benefit, Cost],
            None,
            0.10,
        )
        .unwrap();

        assert_eq!(s.variations.len(), 4);
        assert_eq!(s.variations[0].key(), "C0_increase");
        assert_eq!(s.variations[1].key(), "C0_decrease");
        for v in &s.variations {
            assert!((v.weights.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        assert!(s.is_stable());
    }

    #[test]
    fn weight_sensitivity_detects_rank_flip() {
        // Two alternatives that trade off evenly: a small shift decides the winner.
        let decision = matrix(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let s = TopsisAnalyzer::weight_sensitivity(
            &decision,
            &[0.5, 0.5],
            &[Benefit, Benefit],
            None,
            0.2,
        )
        .unwrap();

        assert!(!s.is_stable());
        assert!(s.variations[0].ranking_changed || s.variations[1].ranking_changed);
    }
}
