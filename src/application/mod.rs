//! Application layer - Commands, handlers, problem files and reports.
//!
//! This layer runs the decision models and renders their results.

pub mod handlers;
pub mod problem;
pub mod reports;

pub use handlers::{
    BuiltinAnalysis, PlanOutcome, PricingOutcome, RunAnalysisCommand, RunAnalysisHandler,
    RunAnalysisResult, RunProblemCommand, RunProblemHandler, RunProblemResult,
};
pub use problem::{Problem, ProblemFile, ProblemOutcome};
