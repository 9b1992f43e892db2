//! Application handlers.
//!
//! Command handlers that orchestrate the decision models.

mod run_analysis;
mod run_problem;

pub use run_analysis::{
    BuiltinAnalysis, PlanOutcome, PricingOutcome, RunAnalysisCommand, RunAnalysisHandler,
    RunAnalysisResult,
};
pub use run_problem::{RunProblemCommand, RunProblemHandler, RunProblemResult};
