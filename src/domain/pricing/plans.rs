//! Plan Efficiency - DEA over the Light, Moderate and Heavy subscription plans.
//!
//! Inputs are the resources a plan consumes (annual cost per customer,
//! service visits per year); outputs are what it produces (satisfaction,
//! annual revenue, 12-month retention).

use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::foundation::{AnalysisError, Orientation};
use crate::domain::mcdm::{DeaAnalyzer, DeaSweep, TargetAdjustment};

/// Subscription tier, also used as a customer usage segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Light,
    Moderate,
    Heavy,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Light => "light",
            PlanTier::Moderate => "moderate",
            PlanTier::Heavy => "heavy",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::Light => "Light",
            PlanTier::Moderate => "Moderate",
            PlanTier::Heavy => "Heavy",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PlanTier {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(PlanTier::Light),
            "moderate" => Ok(PlanTier::Moderate),
            "heavy" => Ok(PlanTier::Heavy),
            _ => Err(AnalysisError::UnknownPlan(s.to_string())),
        }
    }
}

/// One subscription plan with its DEA inputs and outputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubscriptionPlan {
    pub tier: PlanTier,
    pub description: &'static str,
    pub monthly_fee: u32,
    pub hours_included: u32,
    /// Annual company cost per customer (₹).
    pub cost_per_customer: f64,
    pub service_visits: f64,
    pub satisfaction_score: f64,
    /// Annual revenue per customer (₹), 12 × monthly fee.
    pub annual_revenue: f64,
    /// Retention at 12 months (%).
    pub retention_rate: f64,
}

impl SubscriptionPlan {
    pub fn inputs(&self) -> [f64; 2] {
        [self.cost_per_customer, self.service_visits]
    }

    pub fn outputs(&self) -> [f64; 3] {
        [self.satisfaction_score, self.annual_revenue, self.retention_rate]
    }
}

/// The plans, in DMU order.
pub const PLANS: [SubscriptionPlan; 3] = [
    SubscriptionPlan {
        tier: PlanTier::Light,
        description: "Entry-level plan for light AC users (120 hrs/month)",
        monthly_fee: 499,
        hours_included: 150,
        cost_per_customer: 8000.0,
        service_visits: 2.0,
        satisfaction_score: 72.0,
        annual_revenue: 5988.0,
        retention_rate: 82.0,
    },
    SubscriptionPlan {
        tier: PlanTier::Moderate,
        description: "Balanced plan for average users (200 hrs/month)",
        monthly_fee: 649,
        hours_included: 225,
        cost_per_customer: 10500.0,
        service_visits: 3.0,
        satisfaction_score: 81.0,
        annual_revenue: 7788.0,
        retention_rate: 88.0,
    },
    SubscriptionPlan {
        tier: PlanTier::Heavy,
        description: "Premium plan for heavy users (320 hrs/month)",
        monthly_fee: 899,
        hours_included: 350,
        cost_per_customer: 14000.0,
        service_visits: 4.0,
        satisfaction_score: 88.0,
        annual_revenue: 10788.0,
        retention_rate: 92.0,
    },
];

pub const INPUT_LABELS: [&str; 2] = ["Cost/Customer (₹)", "Service Visits"];
pub const OUTPUT_LABELS: [&str; 3] = ["Satisfaction", "Revenue (₹)", "Retention (%)"];

/// A specific output the plan should raise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecommendation {
    pub metric: String,
    pub current: f64,
    pub target: f64,
    pub gap: f64,
    pub increase_percent: f64,
}

/// Why a plan is or is not on the frontier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum PlanDiagnosis {
    Efficient {
        plan: String,
        message: String,
    },
    Inefficient {
        plan: String,
        efficiency_score: f64,
        inefficiency_percent: f64,
        reference_plans: Vec<String>,
        recommendations: Vec<OutputRecommendation>,
        improvement_percent: f64,
        message: String,
    },
}

impl PlanDiagnosis {
    pub fn is_efficient(&self) -> bool {
        matches!(self, PlanDiagnosis::Efficient { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            PlanDiagnosis::Efficient { message, .. } | PlanDiagnosis::Inefficient { message, .. } => {
                message
            }
        }
    }
}

/// Efficiency under one choice of input columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpecResult {
    pub key: &'static str,
    pub label: &'static str,
    pub efficiencies: Vec<f64>,
    pub frontier: Vec<String>,
}

/// Alternative input specifications: (key, label, input columns).
const INPUT_SPECS: [(&str, &str, &[usize]); 3] = [
    ("base", "Cost + Visits", &[0, 1]),
    ("cost_only", "Cost only", &[0]),
    ("visits_only", "Visits only", &[1]),
];

/// DEA over the subscription plans.
pub struct PlanEfficiencyModel;

impl PlanEfficiencyModel {
    pub fn plans() -> &'static [SubscriptionPlan; 3] {
        &PLANS
    }

    pub fn names() -> Vec<String> {
        PLANS.iter().map(|p| p.tier.display_name().to_string()).collect()
    }

    /// DMUs × inputs.
    pub fn input_matrix() -> DMatrix<f64> {
        DMatrix::from_fn(PLANS.len(), INPUT_LABELS.len(), |r, c| PLANS[r].inputs()[c])
    }

    /// DMUs × outputs.
    pub fn output_matrix() -> DMatrix<f64> {
        DMatrix::from_fn(PLANS.len(), OUTPUT_LABELS.len(), |r, c| PLANS[r].outputs()[c])
    }

    /// Full DEA sweep over the plans.
    pub fn analyze(orientation: Orientation) -> Result<DeaSweep, AnalysisError> {
        let names = Self::names();
        DeaAnalyzer::efficiency_all(
            &Self::input_matrix(),
            &Self::output_matrix(),
            Some(names.as_slice()),
            orientation,
        )
    }

    /// Output-oriented diagnosis of one plan by name (case-insensitive).
    ///
    /// Inefficient plans get their reference plans and one recommendation
    /// per output that must rise to reach the frontier.
    pub fn diagnose(plan_name: &str) -> Result<PlanDiagnosis, AnalysisError> {
        let tier: PlanTier = plan_name.parse()?;
        let idx = PLANS
            .iter()
            .position(|p| p.tier == tier)
            .ok_or_else(|| AnalysisError::UnknownPlan(plan_name.to_string()))?;
        let plan = tier.display_name().to_string();

        let sweep = Self::analyze(Orientation::Output)?;
        let result = &sweep.results[idx];

        if result.is_efficient() {
            return Ok(PlanDiagnosis::Efficient {
                message: format!("{plan} is on the efficient frontier. No improvements needed."),
                plan,
            });
        }

        let efficiency = result.efficiency().unwrap_or(0.0);
        let reference_plans = result
            .peers()
            .iter()
            .map(|&p| sweep.names[p].clone())
            .collect();

        let (recommendations, improvement_percent) = match sweep.target_for(idx).map(|t| &t.adjustment) {
            Some(TargetAdjustment::Output {
                current_outputs,
                target_outputs,
                improvement_percent,
                ..
            }) => {
                let recommendations = OUTPUT_LABELS
                    .iter()
                    .zip(current_outputs.iter().zip(target_outputs))
                    .filter_map(|(label, (&current, &target))| {
                        let gap = target - current;
                        (gap > 0.0).then(|| OutputRecommendation {
                            metric: label.to_string(),
                            current,
                            target,
                            gap,
                            increase_percent: gap / current * 100.0,
                        })
                    })
                    .collect();
                (recommendations, *improvement_percent)
            }
            _ => (Vec::new(), 0.0),
        };

        debug!(plan = %plan, efficiency, "Plan diagnosed as inefficient");

        Ok(PlanDiagnosis::Inefficient {
            message: format!(
                "{plan} can improve outputs by {improvement_percent:.1}% to reach the frontier."
            ),
            plan,
            efficiency_score: efficiency,
            inefficiency_percent: (1.0 - efficiency) * 100.0,
            reference_plans,
            recommendations,
            improvement_percent,
        })
    }

    /// Re-runs the output-oriented sweep with each input specification.
    ///
    /// Each specification works on its own column subset of the input matrix.
    pub fn input_sensitivity() -> Result<Vec<InputSpecResult>, AnalysisError> {
        let inputs = Self::input_matrix();
        let outputs = Self::output_matrix();
        let names = Self::names();

        INPUT_SPECS
            .iter()
            .map(|&(key, label, columns)| {
                let subset = inputs.select_columns(columns.iter());
                let sweep =
                    DeaAnalyzer::efficiency_all(&subset, &outputs, Some(names.as_slice()), Orientation::Output)?;
                Ok(InputSpecResult {
                    key,
                    label,
                    frontier: sweep.frontier_names().into_iter().map(String::from).collect(),
                    efficiencies: sweep.efficiencies,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrices_follow_plan_order() {
        let inputs = PlanEfficiencyModel::input_matrix();
        let outputs = PlanEfficiencyModel::output_matrix();

        assert_eq!(inputs.shape(), (3, 2));
        assert_eq!(outputs.shape(), (3, 3));
        assert_eq!(inputs[(2, 0)], 14000.0);
        assert_eq!(outputs[(0, 1)], 5988.0);
    }

    #[test]
    fn annual_revenue_is_twelve_monthly_fees() {
        for plan in PlanEfficiencyModel::plans() {
            assert_eq!(plan.annual_revenue, f64::from(plan.monthly_fee * 12));
        }
    }

    #[test]
    fn heavy_plan_is_on_the_frontier() {
        let sweep = PlanEfficiencyModel::analyze(Orientation::Output).unwrap();
        assert!(sweep.frontier_names().contains(&"Heavy"));
        assert!(sweep.failed_dmus.is_empty());
    }

    #[test]
    fn efficient_plan_needs_no_improvement() {
        let diagnosis = PlanEfficiencyModel::diagnose("heavy").unwrap();
        assert!(diagnosis.is_efficient());
        assert_eq!(
            diagnosis.message(),
            "Heavy is on the efficient frontier. No improvements needed."
        );
    }

    #[test]
    fn moderate_plan_gets_recommendations() {
        let diagnosis = PlanEfficiencyModel::diagnose("Moderate").unwrap();
        match diagnosis {
            PlanDiagnosis::Inefficient {
                efficiency_score,
                reference_plans,
                recommendations,
                improvement_percent,
                message,
                ..
            } => {
                assert!(efficiency_score < 1.0);
                assert!(!reference_plans.is_empty());
                assert!(!reference_plans.contains(&"Moderate".to_string()));
                assert_eq!(recommendations.len(), 3);
                assert!(recommendations
                    .iter()
                    .all(|r| (r.increase_percent - improvement_percent).abs() < 1e-6));
                assert!(message.starts_with("Moderate can improve outputs by"));
            }
            other => panic!("expected inefficient diagnosis, got {other:?}"),
        }
    }

    #[test]
    fn unknown_plan_is_rejected() {
        assert_eq!(
            PlanEfficiencyModel::diagnose("Platinum"),
            Err(AnalysisError::UnknownPlan("Platinum".to_string()))
        );
    }

    #[test]
    fn input_sensitivity_covers_three_specifications() {
        let results = PlanEfficiencyModel::input_sensitivity().unwrap();
        let keys: Vec<&str> = results.iter().map(|r| r.key).collect();

        assert_eq!(keys, vec!["base", "cost_only", "visits_only"]);
        for r in &results {
            assert_eq!(r.efficiencies.len(), 3);
            assert!(!r.frontier.is_empty());
        }
    }

    #[test]
    fn input_sensitivity_leaves_plan_data_untouched() {
        PlanEfficiencyModel::input_sensitivity().unwrap();
        assert_eq!(PlanEfficiencyModel::input_matrix().ncols(), 2);
    }
}
