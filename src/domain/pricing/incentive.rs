//! Incentive Criteria - AHP weights for designing the incentive mechanism.
//!
//! Four criteria compared pairwise on the Saaty scale. The resulting weights
//! feed the pricing-scenario TOPSIS.

use serde::Serialize;
use tracing::debug;

use crate::domain::foundation::AnalysisError;
use crate::domain::mcdm::{AhpAnalyzer, ComparisonMatrix, ConsistencyReport, SensitivityReport};

/// One incentive-design criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncentiveCriterion {
    pub name: &'static str,
    pub short: &'static str,
    pub description: &'static str,
    pub weight_rationale: &'static str,
}

pub const INCENTIVE_CRITERIA: [IncentiveCriterion; 4] = [
    IncentiveCriterion {
        name: "Customer Satisfaction",
        short: "Satisfaction",
        description: "Drives adoption, retention, NPS scores",
        weight_rationale: "High priority, without customers there is no business",
    },
    IncentiveCriterion {
        name: "Moral Hazard Control",
        short: "MoralHazard",
        description: "Prevents gaming, overuse, IC violations",
        weight_rationale: "Medium priority, a known incentive-compatibility issue",
    },
    IncentiveCriterion {
        name: "Revenue Protection",
        short: "Revenue",
        description: "Ensures margins, cash flow predictability",
        weight_rationale: "High priority, sustainability requires profit",
    },
    IncentiveCriterion {
        name: "Operational Simplicity",
        short: "Simplicity",
        description: "Easy to implement, explain to customers",
        weight_rationale: "Low priority, nice-to-have but not essential",
    },
];

/// A documented pairwise judgment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JudgmentRationale {
    pub pair: (usize, usize),
    pub value: f64,
    pub interpretation: &'static str,
    pub rationale: &'static str,
}

pub const INCENTIVE_JUDGMENTS: [JudgmentRationale; 6] = [
    JudgmentRationale {
        pair: (0, 1),
        value: 2.0,
        interpretation: "Satisfaction is SLIGHTLY more important than Moral Hazard",
        rationale: "Customer adoption is the prerequisite for everything. Without satisfied \
                    customers, moral hazard control is irrelevant. The observed IC violation \
                    shows moral hazard is still significant.",
    },
    JudgmentRationale {
        pair: (0, 2),
        value: 1.0,
        interpretation: "Satisfaction and Revenue are EQUALLY important",
        rationale: "Both are critical success factors. Satisfaction drives adoption and \
                    revenue ensures survival. Neither can be sacrificed for the other in the \
                    long run.",
    },
    JudgmentRationale {
        pair: (0, 3),
        value: 5.0,
        interpretation: "Satisfaction is STRONGLY more important than Simplicity",
        rationale: "Complexity can be managed internally; dissatisfied customers leave. \
                    Systems can absorb complexity if it improves satisfaction.",
    },
    JudgmentRationale {
        pair: (1, 2),
        value: 0.5,
        interpretation: "Revenue is SLIGHTLY more important than Moral Hazard",
        rationale: "Revenue enables scaling and investment in better moral hazard controls. \
                    Some gaming is acceptable if it keeps customers and revenue.",
    },
    JudgmentRationale {
        pair: (1, 3),
        value: 3.0,
        interpretation: "Moral Hazard is MODERATELY more important than Simplicity",
        rationale: "Gaming prevention protects the business model. Simplicity is nice but \
                    not worth allowing abuse.",
    },
    JudgmentRationale {
        pair: (2, 3),
        value: 4.0,
        interpretation: "Revenue is STRONGLY/MODERATELY more important than Simplicity",
        rationale: "Revenue is a hard business requirement; simplicity is a soft preference. \
                    Operational complexity is accepted for better financial outcomes.",
    },
];

/// Judgments perturbed in the sensitivity run.
pub const SENSITIVITY_PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// Default relative perturbation for the sensitivity run.
pub const DEFAULT_AHP_VARIATION: f64 = 0.25;

/// Incentive weights keyed by criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncentiveWeights {
    pub satisfaction: f64,
    pub moral_hazard: f64,
    pub revenue: f64,
    pub simplicity: f64,
}

impl IncentiveWeights {
    fn from_slice(weights: &[f64]) -> Result<Self, AnalysisError> {
        match *weights {
            [satisfaction, moral_hazard, revenue, simplicity] => Ok(Self {
                satisfaction,
                moral_hazard,
                revenue,
                simplicity,
            }),
            _ => Err(AnalysisError::dimension_mismatch(
                "incentive_weights",
                INCENTIVE_CRITERIA.len(),
                weights.len(),
            )),
        }
    }
}

/// Complete incentive AHP run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncentiveAnalysis {
    pub matrix: ComparisonMatrix,
    pub consistency: ConsistencyReport,
    pub sensitivity: SensitivityReport,
    pub weights: IncentiveWeights,
}

impl IncentiveAnalysis {
    /// `(short label, weight)` in criterion order.
    pub fn labelled_weights(&self) -> Vec<(&'static str, f64)> {
        INCENTIVE_CRITERIA
            .iter()
            .zip(&self.consistency.weights)
            .map(|(c, &w)| (c.short, w))
            .collect()
    }
}

/// AHP over the incentive criteria.
pub struct IncentiveModel;

impl IncentiveModel {
    /// The 4×4 comparison matrix built from the documented judgments.
    pub fn comparison_matrix() -> Result<ComparisonMatrix, AnalysisError> {
        AhpAnalyzer::build_matrix(
            INCENTIVE_JUDGMENTS.iter().map(|j| (j.pair, j.value)),
            INCENTIVE_CRITERIA.len(),
        )
    }

    /// Weights, consistency and ±`variation` sensitivity on the key judgments.
    pub fn analyze(variation: f64) -> Result<IncentiveAnalysis, AnalysisError> {
        let matrix = Self::comparison_matrix()?;
        let consistency = AhpAnalyzer::weights_and_consistency(&matrix);
        let sensitivity = AhpAnalyzer::sensitivity(&matrix, &SENSITIVITY_PAIRS, variation)?;
        let weights = IncentiveWeights::from_slice(&consistency.weights)?;

        debug!(cr = consistency.cr, ?weights, "Incentive AHP complete");

        Ok(IncentiveAnalysis {
            matrix,
            consistency,
            sensitivity,
            weights,
        })
    }

    /// Incentive weights without the sensitivity run.
    pub fn weights() -> Result<IncentiveWeights, AnalysisError> {
        let matrix = Self::comparison_matrix()?;
        IncentiveWeights::from_slice(&AhpAnalyzer::weights_and_consistency(&matrix).weights)
    }
}
