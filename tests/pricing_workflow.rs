//! Integration tests for the pricing decision workflow.
//!
//! These tests verify the end-to-end flow:
//! 1. Incentive AHP produces consistent, robust criterion weights
//! 2. The weights drive the pricing-scenario TOPSIS
//! 3. Plan DEA identifies the frontier and diagnoses the inefficient plan
//! 4. Problem files on disk run through the same engines

use std::io::Write;

use sesp_mcdm::application::{
    BuiltinAnalysis, ProblemOutcome, RunAnalysisCommand, RunAnalysisHandler, RunProblemCommand,
    RunProblemHandler,
};
use sesp_mcdm::config::AnalysisConfig;
use sesp_mcdm::domain::foundation::{ErrorCode, Orientation};
use sesp_mcdm::domain::pricing::{
    IncentiveModel, PlanDiagnosis, PlanEfficiencyModel, PricingModel,
};

// =============================================================================
// Built-in models
// =============================================================================

#[test]
fn incentive_weights_are_consistent_and_robust() {
    let analysis = IncentiveModel::analyze(0.25).unwrap();

    assert!(analysis.consistency.is_consistent);
    assert!(analysis.consistency.cr < 0.10);
    assert_eq!(analysis.sensitivity.variations.len(), 6);
    assert!(analysis.sensitivity.variations.iter().all(|v| v.is_consistent));

    let w = analysis.weights;
    assert!(w.satisfaction > w.revenue);
    assert!(w.revenue > w.moral_hazard);
    assert!(w.moral_hazard > w.simplicity);
}

#[test]
fn ahp_weights_drive_pricing_ranking() {
    let incentive = IncentiveModel::weights().unwrap();
    let weights = PricingModel::weights_from_incentives(&incentive);
    assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1e-9);

    let ranking = PricingModel::rank(Some(weights.as_slice())).unwrap();
    assert_eq!(
        ranking.topsis.ranked_names,
        vec!["Premium_Service", "Balanced_Optimal", "Extended_Value", "Value_Leader"]
    );
    assert_eq!(ranking.recommended().map(|s| s.name), Some("Premium_Service"));

    let sensitivity = PricingModel::sensitivity(&ranking.topsis.weights, 0.10).unwrap();
    assert!(sensitivity.is_stable());
    assert_eq!(sensitivity.variations.len(), 10);
}

#[test]
fn plan_frontier_is_orientation_independent() {
    let output = PlanEfficiencyModel::analyze(Orientation::Output).unwrap();
    let input = PlanEfficiencyModel::analyze(Orientation::Input).unwrap();

    assert_eq!(output.frontier_names(), vec!["Light", "Heavy"]);
    assert_eq!(input.frontier_names(), output.frontier_names());
    for (a, b) in output.efficiencies.iter().zip(&input.efficiencies) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn moderate_plan_is_diagnosed_against_its_peers() {
    match PlanEfficiencyModel::diagnose("Moderate").unwrap() {
        PlanDiagnosis::Inefficient {
            efficiency_score,
            reference_plans,
            recommendations,
            ..
        } => {
            assert!(efficiency_score < 1.0);
            assert!(!reference_plans.is_empty());
            assert!(!reference_plans.contains(&"Moderate".to_string()));
            assert_eq!(recommendations.len(), 3);
        }
        other => panic!("expected Moderate to be inefficient, got {:?}", other),
    }

    let err = PlanEfficiencyModel::diagnose("Platinum").unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownPlan);
}

#[test]
fn full_run_renders_every_report() {
    let result = RunAnalysisHandler::new(AnalysisConfig::default())
        .handle(RunAnalysisCommand {
            analysis: BuiltinAnalysis::All,
        })
        .unwrap();

    assert!(result.incentive.is_some());
    assert!(result.report.contains("RECOMMENDED: Premium_Service"));
    assert!(result.report.contains("Efficient Frontier"));
    assert!(result.report.contains("Input Specification Sensitivity"));

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("incentive").is_some());
    assert!(json.get("report").is_none());
}

// =============================================================================
// Problem files
// =============================================================================

fn write_problem(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn yaml_ahp_problem_with_matrix() {
    let file = write_problem(
        ".yaml",
        r#"
kind: ahp
title: Launch region criteria
criteria: [Demand, Cost, Access]
matrix:
  - [1, 3, 5]
  - [0.333, 1, 2]
  - [0.2, 0.5, 1]
sensitivity_pairs: [[0, 1], [1, 2]]
variation: 0.2
"#,
    );

    let result = RunProblemHandler::new(AnalysisConfig::default())
        .handle(RunProblemCommand {
            path: file.path().to_path_buf(),
        })
        .unwrap();

    match result.outcome {
        ProblemOutcome::Ahp {
            consistency,
            sensitivity,
            ..
        } => {
            assert!(consistency.is_consistent);
            assert_eq!(consistency.priority_order(), vec![0, 1, 2]);
            assert_eq!(sensitivity.unwrap().variations.len(), 4);
        }
        other => panic!("expected AHP outcome, got {:?}", other),
    }
    assert!(result.report.contains("Launch region criteria"));
}

#[test]
fn json_topsis_problem_prefers_dominant_alternative() {
    let file = write_problem(
        ".json",
        r#"{
            "kind": "topsis",
            "alternatives": ["Good", "Bad", "Mixed"],
            "criteria": [
                { "name": "Quality", "type": "benefit", "weight": 2 },
                { "name": "Price", "type": "cost", "weight": 1 }
            ],
            "matrix": [[9, 10], [3, 30], [6, 20]]
        }"#,
    );

    let result = RunProblemHandler::new(AnalysisConfig::default())
        .handle(RunProblemCommand {
            path: file.path().to_path_buf(),
        })
        .unwrap();

    match result.outcome {
        ProblemOutcome::Topsis {
            result, sensitivity, ..
        } => {
            assert_eq!(result.ranked_names, vec!["Good", "Mixed", "Bad"]);
            assert!((result.weights[0] - 2.0 / 3.0).abs() < 1e-9);
            assert_eq!(result.closeness[0], 1.0);
            assert_eq!(result.closeness[1], 0.0);
            assert!(sensitivity.is_stable());
        }
        other => panic!("expected TOPSIS outcome, got {:?}", other),
    }
}

#[test]
fn problem_file_errors_carry_codes() {
    let cases = [
        ("kind: ahp\nmatrix: [[1, 2], [2, 1]]\n", ErrorCode::InvalidJudgment),
        ("kind: dea\ninputs: [[1], [0]]\noutputs: [[1], [1]]\n", ErrorCode::NonPositiveValue),
        ("kind: dea\ninputs: [[1], [2]]\noutputs: [[1]]\n", ErrorCode::DimensionMismatch),
        ("kind: topsis\ncriteria: []\n", ErrorCode::ProblemFile),
    ];

    for (contents, expected) in cases {
        let file = write_problem(".yaml", contents);
        let err = RunProblemHandler::new(AnalysisConfig::default())
            .handle(RunProblemCommand {
                path: file.path().to_path_buf(),
            })
            .unwrap_err();
        assert_eq!(err.code(), expected, "{contents}");
    }
}
