//! Pricing Module - Decision models for the subscription appliance program.
//!
//! Each model feeds fixed program data into one MCDM engine:
//!
//! - `IncentiveModel` - AHP weights for the incentive-mechanism criteria
//! - `PricingModel` - TOPSIS ranking of pricing scenarios, weighted from the incentive AHP
//! - `PlanEfficiencyModel` - DEA efficiency of the Light / Moderate / Heavy plans

mod incentive;
mod plans;
mod scenarios;

pub use incentive::{
    IncentiveAnalysis, IncentiveCriterion, IncentiveModel, IncentiveWeights, JudgmentRationale,
    DEFAULT_AHP_VARIATION, INCENTIVE_CRITERIA, INCENTIVE_JUDGMENTS, SENSITIVITY_PAIRS,
};
pub use plans::{
    InputSpecResult, OutputRecommendation, PlanDiagnosis, PlanEfficiencyModel, PlanTier,
    SubscriptionPlan, INPUT_LABELS, OUTPUT_LABELS, PLANS,
};
pub use scenarios::{
    PricingCriterion, PricingModel, PricingRanking, PricingScenario, ScenarioMetrics,
    DEFAULT_TOPSIS_VARIATION, FALLBACK_WEIGHTS, PRICING_CRITERIA, PRICING_SCENARIOS,
};
