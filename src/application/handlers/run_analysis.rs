//! RunAnalysisHandler - Command handler for the built-in program analyses.
//!
//! Runs any of the three program models:
//! - Incentive criteria → AHP weights, consistency, judgment sensitivity
//! - Pricing scenarios → TOPSIS ranking weighted from the AHP, weight sensitivity
//! - Subscription plans → DEA frontier, plan diagnosis, input sensitivity
//!
//! When the AHP runs in the same command its weights feed the TOPSIS directly.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::domain::foundation::AnalysisError;
use crate::domain::mcdm::{DeaSweep, TopsisSensitivity};
use crate::domain::pricing::{
    IncentiveAnalysis, IncentiveModel, InputSpecResult, PlanDiagnosis, PlanEfficiencyModel,
    PricingModel, PricingRanking,
};

use crate::application::reports;

/// Which built-in analyses to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinAnalysis {
    Ahp,
    Topsis,
    Dea,
    All,
}

impl BuiltinAnalysis {
    fn includes(&self, other: BuiltinAnalysis) -> bool {
        *self == BuiltinAnalysis::All || *self == other
    }
}

/// Command to run built-in analyses.
#[derive(Debug, Clone)]
pub struct RunAnalysisCommand {
    pub analysis: BuiltinAnalysis,
}

/// TOPSIS ranking plus its weight sensitivity.
#[derive(Debug, Clone, Serialize)]
pub struct PricingOutcome {
    pub ranking: PricingRanking,
    pub sensitivity: TopsisSensitivity,
}

/// DEA sweep plus per-plan diagnosis and input sensitivity.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub sweep: DeaSweep,
    pub diagnoses: Vec<PlanDiagnosis>,
    pub input_specs: Vec<InputSpecResult>,
}

/// Result of a built-in analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct RunAnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incentive: Option<IncentiveAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plans: Option<PlanOutcome>,
    /// Rendered reports, in run order.
    #[serde(skip)]
    pub report: String,
}

/// Handles [`RunAnalysisCommand`].
pub struct RunAnalysisHandler {
    config: AnalysisConfig,
}

impl RunAnalysisHandler {
    /// Creates a new RunAnalysisHandler.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn handle(&self, cmd: RunAnalysisCommand) -> Result<RunAnalysisResult, AnalysisError> {
        debug!(analysis = ?cmd.analysis, "Running built-in analysis");
        let mut sections = Vec::new();

        let incentive = if cmd.analysis.includes(BuiltinAnalysis::Ahp) {
            let analysis = IncentiveModel::analyze(self.config.ahp_variation)?;
            info!(
                cr = analysis.consistency.cr,
                consistent = analysis.consistency.is_consistent,
                "Incentive AHP complete"
            );
            sections.push(reports::incentive_report(&analysis));
            Some(analysis)
        } else {
            None
        };

        let pricing = if cmd.analysis.includes(BuiltinAnalysis::Topsis) {
            let weights = match &incentive {
                Some(analysis) => PricingModel::weights_from_incentives(&analysis.weights),
                None => PricingModel::default_weights(),
            };
            let ranking = PricingModel::rank(Some(weights.as_slice()))?;
            let sensitivity =
                PricingModel::sensitivity(&ranking.topsis.weights, self.config.topsis_variation)?;
            info!(
                best = ranking.topsis.best().unwrap_or("none"),
                stable = sensitivity.is_stable(),
                "Pricing TOPSIS complete"
            );
            sections.push(reports::pricing_report(&ranking, Some(&sensitivity)));
            Some(PricingOutcome {
                ranking,
                sensitivity,
            })
        } else {
            None
        };

        let plans = if cmd.analysis.includes(BuiltinAnalysis::Dea) {
            let sweep = PlanEfficiencyModel::analyze(self.config.dea_orientation)?;
            let diagnoses = PlanEfficiencyModel::names()
                .iter()
                .map(|name| PlanEfficiencyModel::diagnose(name))
                .collect::<Result<Vec<_>, _>>()?;
            let input_specs = PlanEfficiencyModel::input_sensitivity()?;
            info!(
                orientation = %sweep.orientation,
                frontier = ?sweep.frontier_names(),
                "Plan DEA complete"
            );
            sections.push(reports::plan_report(&sweep, &diagnoses, &input_specs));
            Some(PlanOutcome {
                sweep,
                diagnoses,
                input_specs,
            })
        } else {
            None
        };

        Ok(RunAnalysisResult {
            incentive,
            pricing,
            plans,
            report: sections.join("\n\n"),
        })
    }
}
