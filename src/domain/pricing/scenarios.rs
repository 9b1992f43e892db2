//! Pricing Scenarios - TOPSIS ranking of subsidy / fee / tenure combinations.
//!
//! Scenario metrics come from fixed estimation formulas over subsidy
//! percentage and monthly fee. Criterion weights default to a mapping of the
//! incentive AHP weights.

use nalgebra::DMatrix;
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::{debug, warn};

use super::incentive::{IncentiveModel, IncentiveWeights};
use super::plans::PlanTier;
use crate::domain::foundation::{AnalysisError, CriterionType};
use crate::domain::mcdm::{TopsisAnalyzer, TopsisResult, TopsisSensitivity};

/// Reference monthly fee the estimation formulas are centred on (₹).
const REFERENCE_FEE: f64 = 599.0;

/// Default relative perturbation for weight sensitivity.
pub const DEFAULT_TOPSIS_VARIATION: f64 = 0.10;

/// Weights used when incentive weights are unavailable.
pub const FALLBACK_WEIGHTS: [f64; 5] = [0.25, 0.30, 0.15, 0.15, 0.15];

/// One subsidy / fee / tenure combination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricingScenario {
    pub name: &'static str,
    pub description: &'static str,
    /// Upfront subsidy (₹).
    pub subsidy: u32,
    /// Subsidy as a percentage of MRP.
    pub subsidy_percent: f64,
    pub monthly_fee: u32,
    pub plan: PlanTier,
    pub tenure_months: u32,
    pub target_segment: PlanTier,
    /// Validated customer savings (%).
    pub expected_savings: f64,
    pub rationale: &'static str,
}

pub const PRICING_SCENARIOS: [PricingScenario; 4] = [
    PricingScenario {
        name: "Value_Leader",
        description: "Maximum value for price-conscious customers",
        subsidy: 31_500,
        subsidy_percent: 70.0,
        monthly_fee: 499,
        plan: PlanTier::Light,
        tenure_months: 24,
        target_segment: PlanTier::Light,
        expected_savings: 22.5,
        rationale: "Best value proposition for budget-conscious, low-usage customers",
    },
    PricingScenario {
        name: "Balanced_Optimal",
        description: "Optimal trade-off between value and service",
        subsidy: 29_250,
        subsidy_percent: 65.0,
        monthly_fee: 649,
        plan: PlanTier::Moderate,
        tenure_months: 24,
        target_segment: PlanTier::Moderate,
        expected_savings: 19.9,
        rationale: "Sweet spot for mainstream families with average usage",
    },
    PricingScenario {
        name: "Extended_Value",
        description: "Long-term commitment with strong savings",
        subsidy: 31_500,
        subsidy_percent: 70.0,
        monthly_fee: 649,
        plan: PlanTier::Moderate,
        tenure_months: 36,
        target_segment: PlanTier::Moderate,
        expected_savings: 20.2,
        rationale: "Best for families wanting long-term relationship with brand",
    },
    PricingScenario {
        name: "Premium_Service",
        description: "Full service package for heavy users",
        subsidy: 31_500,
        subsidy_percent: 70.0,
        monthly_fee: 899,
        plan: PlanTier::Heavy,
        tenure_months: 24,
        target_segment: PlanTier::Heavy,
        expected_savings: 14.1,
        rationale: "Premium service for WFH, joint families, heavy usage needs",
    },
];

/// A TOPSIS criterion for scenario ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricingCriterion {
    pub name: &'static str,
    pub short: &'static str,
    pub criterion_type: CriterionType,
    pub description: &'static str,
}

pub const PRICING_CRITERIA: [PricingCriterion; 5] = [
    PricingCriterion {
        name: "Customer Savings %",
        short: "Savings",
        criterion_type: CriterionType::Benefit,
        description: "Percentage savings vs outright purchase (NPV)",
    },
    PricingCriterion {
        name: "Company Margin %",
        short: "Margin",
        criterion_type: CriterionType::Benefit,
        description: "Net profit margin for the company",
    },
    PricingCriterion {
        name: "Break-even Period",
        short: "Breakeven",
        criterion_type: CriterionType::Cost,
        description: "Months until cumulative cash flow turns positive",
    },
    PricingCriterion {
        name: "Churn Risk %",
        short: "Churn",
        criterion_type: CriterionType::Cost,
        description: "Estimated probability of customer leaving early",
    },
    PricingCriterion {
        name: "Adoption Score",
        short: "Adoption",
        criterion_type: CriterionType::Benefit,
        description: "Composite score for market adoption potential",
    },
];

/// Estimated criterion values for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    pub customer_savings: f64,
    pub company_margin: f64,
    pub breakeven_months: f64,
    pub churn_risk: f64,
    pub adoption_score: f64,
}

impl ScenarioMetrics {
    /// Estimates metrics from subsidy percentage and fee.
    ///
    /// Higher subsidy raises savings and break-even time and lowers margin;
    /// a fee above the reference does the opposite. Churn and adoption are
    /// derived from the unclamped savings.
    pub fn estimate(scenario: &PricingScenario) -> Self {
        let subsidy = scenario.subsidy_percent;
        let fee_delta = f64::from(scenario.monthly_fee) - REFERENCE_FEE;

        let savings = subsidy * 0.5 - fee_delta / 20.0;
        let margin = 35.0 - subsidy * 0.4 + fee_delta / 30.0;
        let breakeven = 12.0 + subsidy * 0.3 - fee_delta / 50.0;
        let churn = 10.0 - savings * 0.2 + fee_delta / 75.0;
        let adoption = 50.0 + savings * 2.0 - churn;

        Self {
            customer_savings: round_to(savings.max(0.0), 1),
            company_margin: round_to(margin.max(5.0), 1),
            breakeven_months: round_to(breakeven.clamp(12.0, 36.0), 0),
            churn_risk: round_to(churn.clamp(5.0, 25.0), 1),
            adoption_score: round_to(adoption.clamp(30.0, 100.0), 0),
        }
    }

    /// Values in criterion order.
    pub fn to_row(&self) -> [f64; 5] {
        [
            self.customer_savings,
            self.company_margin,
            self.breakeven_months,
            self.churn_risk,
            self.adoption_score,
        ]
    }
}

/// Rounds half to even at `decimals` places.
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

static SCENARIO_METRICS: Lazy<Vec<ScenarioMetrics>> =
    Lazy::new(|| PRICING_SCENARIOS.iter().map(ScenarioMetrics::estimate).collect());

/// Scenario ranking with the metrics and weights it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingRanking {
    pub metrics: Vec<ScenarioMetrics>,
    pub topsis: TopsisResult,
}

impl PricingRanking {
    /// The top-ranked scenario.
    pub fn recommended(&self) -> Option<&'static PricingScenario> {
        let best = *self.topsis.ranking.first()?;
        PRICING_SCENARIOS.get(best)
    }
}

/// TOPSIS over the pricing scenarios.
pub struct PricingModel;

impl PricingModel {
    pub fn scenarios() -> &'static [PricingScenario; 4] {
        &PRICING_SCENARIOS
    }

    pub fn names() -> Vec<String> {
        PRICING_SCENARIOS.iter().map(|s| s.name.to_string()).collect()
    }

    /// Estimated metrics, in scenario order.
    pub fn metrics() -> &'static [ScenarioMetrics] {
        &SCENARIO_METRICS
    }

    /// Scenarios × criteria.
    pub fn decision_matrix() -> DMatrix<f64> {
        let metrics = Self::metrics();
        DMatrix::from_fn(metrics.len(), PRICING_CRITERIA.len(), |r, c| metrics[r].to_row()[c])
    }

    pub fn criteria_types() -> Vec<CriterionType> {
        PRICING_CRITERIA.iter().map(|c| c.criterion_type).collect()
    }

    /// Maps incentive weights onto the pricing criteria and renormalizes.
    ///
    /// Savings and adoption draw on satisfaction (0.6 / 0.4), margin and
    /// break-even on revenue (1.0 / 0.3), churn on moral hazard (0.5).
    pub fn weights_from_incentives(incentive: &IncentiveWeights) -> Vec<f64> {
        let raw = [
            incentive.satisfaction * 0.6,
            incentive.revenue,
            incentive.revenue * 0.3,
            incentive.moral_hazard * 0.5,
            incentive.satisfaction * 0.4,
        ];
        let sum: f64 = raw.iter().sum();
        raw.iter().map(|w| w / sum).collect()
    }

    /// Weights derived from the incentive AHP, or [`FALLBACK_WEIGHTS`].
    pub fn default_weights() -> Vec<f64> {
        match IncentiveModel::weights() {
            Ok(incentive) => Self::weights_from_incentives(&incentive),
            Err(e) => {
                warn!(error = %e, "Incentive weights unavailable, using fallback weights");
                FALLBACK_WEIGHTS.to_vec()
            }
        }
    }

    /// Ranks the scenarios. `None` uses [`PricingModel::default_weights`].
    pub fn rank(weights: Option<&[f64]>) -> Result<PricingRanking, AnalysisError> {
        let weights = weights.map_or_else(Self::default_weights, <[f64]>::to_vec);
        let names = Self::names();
        let topsis = TopsisAnalyzer::rank(
            &Self::decision_matrix(),
            &weights,
            &Self::criteria_types(),
            Some(names.as_slice()),
        )?;

        debug!(best = ?topsis.best(), "Pricing scenarios ranked");

        Ok(PricingRanking {
            metrics: Self::metrics().to_vec(),
            topsis,
        })
    }

    /// Ranking stability under ±`variation` on each criterion weight.
    pub fn sensitivity(weights: &[f64], variation: f64) -> Result<TopsisSensitivity, AnalysisError> {
        let names = Self::names();
        TopsisAnalyzer::weight_sensitivity(
            &Self::decision_matrix(),
            weights,
            &Self::criteria_types(),
            Some(names.as_slice()),
            variation,
        )
    }
}
