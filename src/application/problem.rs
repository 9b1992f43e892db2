//! Problem files - Ad-hoc AHP, TOPSIS and DEA problems read from YAML or JSON.
//!
//! The `kind` field selects the engine:
//!
//! ```yaml
//! kind: topsis
//! title: Supplier choice
//! alternatives: [A, B, C]
//! criteria:
//!   - { name: Price, type: cost, weight: 0.5 }
//!   - { name: Quality, type: benefit, weight: 0.5 }
//! matrix:
//!   - [100, 7]
//!   - [120, 9]
//!   - [90, 5]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::domain::foundation::{AnalysisError, CriterionType, Orientation};
use crate::domain::mcdm::{
    matrix_from_rows, AhpAnalyzer, ComparisonMatrix, ConsistencyReport, DeaAnalyzer, DeaSweep,
    Judgment, SensitivityReport, TopsisAnalyzer, TopsisResult, TopsisSensitivity,
};

use super::reports;

/// A problem file: optional title plus one tagged problem.
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemFile {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub problem: Problem,
}

/// A decision problem for one engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Problem {
    Ahp(AhpProblem),
    Topsis(TopsisProblem),
    Dea(DeaProblem),
}

/// Pairwise comparison problem, given as judgments or a full matrix.
#[derive(Debug, Clone, Deserialize)]
pub struct AhpProblem {
    #[serde(default)]
    pub criteria: Vec<String>,
    /// Matrix size when building from judgments without criterion names.
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub judgments: Option<Vec<Judgment>>,
    #[serde(default)]
    pub matrix: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub sensitivity_pairs: Vec<(usize, usize)>,
    #[serde(default)]
    pub variation: Option<f64>,
}

/// One TOPSIS criterion column.
#[derive(Debug, Clone, Deserialize)]
pub struct TopsisCriterion {
    pub name: String,
    #[serde(rename = "type")]
    pub criterion_type: String,
    pub weight: f64,
}

/// Ranking problem over a decision matrix.
#[derive(Debug, Clone, Deserialize)]
pub struct TopsisProblem {
    #[serde(default)]
    pub alternatives: Vec<String>,
    pub criteria: Vec<TopsisCriterion>,
    pub matrix: Vec<Vec<f64>>,
    #[serde(default)]
    pub variation: Option<f64>,
}

/// Efficiency problem over DMU input and output rows.
#[derive(Debug, Clone, Deserialize)]
pub struct DeaProblem {
    #[serde(default)]
    pub dmus: Vec<String>,
    pub inputs: Vec<Vec<f64>>,
    pub outputs: Vec<Vec<f64>>,
    #[serde(default)]
    pub orientation: Option<String>,
    #[serde(default)]
    pub input_labels: Vec<String>,
    #[serde(default)]
    pub output_labels: Vec<String>,
}

/// Result of solving a problem file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProblemOutcome {
    Ahp {
        labels: Vec<String>,
        matrix: ComparisonMatrix,
        consistency: ConsistencyReport,
        sensitivity: Option<SensitivityReport>,
    },
    Topsis {
        criteria: Vec<String>,
        result: TopsisResult,
        sensitivity: TopsisSensitivity,
    },
    Dea {
        sweep: DeaSweep,
        input_labels: Vec<String>,
        output_labels: Vec<String>,
    },
}

impl ProblemOutcome {
    /// Renders the outcome as a plain-text report.
    pub fn render(&self, title: &str) -> String {
        match self {
            ProblemOutcome::Ahp {
                labels,
                matrix,
                consistency,
                sensitivity,
            } => reports::ahp_report(title, matrix, labels, consistency, sensitivity.as_ref()),
            ProblemOutcome::Topsis {
                criteria,
                result,
                sensitivity,
            } => reports::topsis_report(title, criteria, result, Some(sensitivity)),
            ProblemOutcome::Dea {
                sweep,
                input_labels,
                output_labels,
            } => reports::dea_report(title, sweep, input_labels, output_labels),
        }
    }
}

fn problem_error(source: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::ProblemFile(source.to_string())
}

impl ProblemFile {
    /// Reads a problem file; `.json` is parsed as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| problem_error(format!("{}: {}", path.display(), e)))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        debug!(path = %path.display(), json = is_json, "Loading problem file");
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, AnalysisError> {
        serde_yaml::from_str(text).map_err(problem_error)
    }

    pub fn from_json_str(text: &str) -> Result<Self, AnalysisError> {
        serde_json::from_str(text).map_err(problem_error)
    }

    /// Title for reports, defaulting to the engine name.
    pub fn display_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => match self.problem {
                Problem::Ahp(_) => "AHP ANALYSIS".to_string(),
                Problem::Topsis(_) => "TOPSIS ANALYSIS".to_string(),
                Problem::Dea(_) => "DEA ANALYSIS".to_string(),
            },
        }
    }
}

impl Problem {
    /// Solves the problem; missing variations and orientation come from `defaults`.
    pub fn solve(&self, defaults: &AnalysisConfig) -> Result<ProblemOutcome, AnalysisError> {
        match self {
            Problem::Ahp(p) => p.solve(defaults),
            Problem::Topsis(p) => p.solve(defaults),
            Problem::Dea(p) => p.solve(defaults),
        }
    }
}

impl AhpProblem {
    fn comparison_matrix(&self) -> Result<ComparisonMatrix, AnalysisError> {
        match (&self.judgments, &self.matrix) {
            (Some(_), Some(_)) => Err(problem_error(
                "AHP problem must give either 'judgments' or 'matrix', not both",
            )),
            (None, None) => Err(problem_error(
                "AHP problem needs 'judgments' or 'matrix'",
            )),
            (Some(judgments), None) => {
                let n = match (self.size, self.criteria.len()) {
                    (Some(size), 0) => size,
                    (Some(size), named) if size != named => {
                        return Err(AnalysisError::dimension_mismatch("size", named, size))
                    }
                    (_, named) => named,
                };
                AhpAnalyzer::build_matrix(judgments.iter().map(|j| ((j.i, j.j), j.value)), n)
            }
            (None, Some(rows)) => ComparisonMatrix::from_rows(rows),
        }
    }

    fn solve(&self, defaults: &AnalysisConfig) -> Result<ProblemOutcome, AnalysisError> {
        let matrix = self.comparison_matrix()?;
        let n = matrix.size();
        if !self.criteria.is_empty() && self.criteria.len() != n {
            return Err(AnalysisError::dimension_mismatch("criteria", n, self.criteria.len()));
        }

        let consistency = AhpAnalyzer::weights_and_consistency(&matrix);
        let sensitivity = if self.sensitivity_pairs.is_empty() {
            None
        } else {
            let variation = self.variation.unwrap_or(defaults.ahp_variation);
            Some(AhpAnalyzer::sensitivity(&matrix, &self.sensitivity_pairs, variation)?)
        };

        Ok(ProblemOutcome::Ahp {
            labels: self.criteria.clone(),
            matrix,
            consistency,
            sensitivity,
        })
    }
}

impl TopsisProblem {
    fn solve(&self, defaults: &AnalysisConfig) -> Result<ProblemOutcome, AnalysisError> {
        let decision = matrix_from_rows("matrix", &self.matrix)?;
        let types: Vec<&str> = self
            .criteria
            .iter()
            .map(|c| c.criterion_type.as_str())
            .collect();
        let criteria_types = CriterionType::parse_all(&types)?;
        let weights: Vec<f64> = self.criteria.iter().map(|c| c.weight).collect();
        let names = (!self.alternatives.is_empty()).then_some(self.alternatives.as_slice());

        let result = TopsisAnalyzer::rank(&decision, &weights, &criteria_types, names)?;
        let variation = self.variation.unwrap_or(defaults.topsis_variation);
        let sensitivity =
            TopsisAnalyzer::weight_sensitivity(&decision, &weights, &criteria_types, names, variation)?;

        Ok(ProblemOutcome::Topsis {
            criteria: self.criteria.iter().map(|c| c.name.clone()).collect(),
            result,
            sensitivity,
        })
    }
}

impl DeaProblem {
    fn solve(&self, defaults: &AnalysisConfig) -> Result<ProblemOutcome, AnalysisError> {
        let inputs = matrix_from_rows("inputs", &self.inputs)?;
        let outputs = matrix_from_rows("outputs", &self.outputs)?;
        let orientation = match &self.orientation {
            Some(tag) => tag.parse::<Orientation>()?,
            None => defaults.dea_orientation,
        };
        let names = (!self.dmus.is_empty()).then_some(self.dmus.as_slice());

        let sweep = DeaAnalyzer::efficiency_all(&inputs, &outputs, names, orientation)?;
        Ok(ProblemOutcome::Dea {
            sweep,
            input_labels: self.input_labels.clone(),
            output_labels: self.output_labels.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    const AHP_YAML: &str = r#"
kind: ahp
title: Vendor criteria
criteria: [Cost, Quality, Support]
judgments:
  - { i: 0, j: 1, value: 3 }
  - { i: 0, j: 2, value: 5 }
  - { i: 1, j: 2, value: 2 }
sensitivity_pairs: [[0, 1]]
"#;

    #[test]
    fn ahp_problem_from_judgments() {
        let file = ProblemFile::from_yaml_str(AHP_YAML).unwrap();
        assert_eq!(file.display_title(), "Vendor criteria");

        let outcome = file.problem.solve(&AnalysisConfig::default()).unwrap();
        match outcome {
            ProblemOutcome::Ahp {
                consistency,
                sensitivity,
                ..
            } => {
                assert!(consistency.is_consistent);
                assert_eq!(consistency.priority_order()[0], 0);
                let sensitivity = sensitivity.unwrap();
                assert_eq!(sensitivity.variation, 0.25);
                assert_eq!(sensitivity.variations.len(), 2);
            }
            other => panic!("expected AHP outcome, got {:?}", other),
        }
    }

    #[test]
    fn ahp_problem_rejects_judgments_and_matrix_together() {
        let yaml = "kind: ahp\nsize: 2\njudgments: [{ i: 0, j: 1, value: 2 }]\nmatrix: [[1, 2], [0.5, 1]]\n";
        let file = ProblemFile::from_yaml_str(yaml).unwrap();
        let err = file.problem.solve(&AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProblemFile);
    }

    #[test]
    fn ahp_size_must_match_criteria() {
        let yaml = "kind: ahp\ncriteria: [A, B]\nsize: 3\njudgments: []\n";
        let file = ProblemFile::from_yaml_str(yaml).unwrap();
        let err = file.problem.solve(&AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DimensionMismatch);
    }

    #[test]
    fn topsis_problem_from_json() {
        let json = r#"{
            "kind": "topsis",
            "alternatives": ["A", "B", "C"],
            "criteria": [
                { "name": "Price", "type": "cost", "weight": 0.5 },
                { "name": "Quality", "type": "benefit", "weight": 0.5 }
            ],
            "matrix": [[100, 7], [120, 9], [90, 5]],
            "variation": 0.05
        }"#;
        let file = ProblemFile::from_json_str(json).unwrap();
        assert_eq!(file.display_title(), "TOPSIS ANALYSIS");

        match file.problem.solve(&AnalysisConfig::default()).unwrap() {
            ProblemOutcome::Topsis {
                criteria,
                result,
                sensitivity,
            } => {
                assert_eq!(criteria, vec!["Price", "Quality"]);
                assert_eq!(result.ranked_names.len(), 3);
                assert_eq!(sensitivity.variation, 0.05);
                assert_eq!(sensitivity.variations.len(), 4);
            }
            other => panic!("expected TOPSIS outcome, got {:?}", other),
        }
    }

    #[test]
    fn topsis_unknown_criterion_type() {
        let yaml = "kind: topsis\ncriteria: [{ name: X, type: gain, weight: 1 }]\nmatrix: [[1], [2]]\n";
        let file = ProblemFile::from_yaml_str(yaml).unwrap();
        let err = file.problem.solve(&AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownCriterionType);
    }

    #[test]
    fn dea_problem_uses_default_orientation() {
        let yaml = r#"
kind: dea
dmus: [A, B, C]
inputs: [[2], [4], [3]]
outputs: [[2], [4], [1]]
"#;
        let file = ProblemFile::from_yaml_str(yaml).unwrap();
        match file.problem.solve(&AnalysisConfig::default()).unwrap() {
            ProblemOutcome::Dea { sweep, .. } => {
                assert_eq!(sweep.orientation, Orientation::Output);
                assert_eq!(sweep.frontier_names(), vec!["A", "B"]);
                assert!(sweep.target_for(2).is_some());
            }
            other => panic!("expected DEA outcome, got {:?}", other),
        }
    }

    #[test]
    fn dea_unknown_orientation() {
        let yaml = "kind: dea\ninputs: [[1]]\noutputs: [[1]]\norientation: sideways\n";
        let file = ProblemFile::from_yaml_str(yaml).unwrap();
        let err = file.problem.solve(&AnalysisConfig::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownOrientation);
    }

    #[test]
    fn unknown_kind_is_a_problem_file_error() {
        let err = ProblemFile::from_yaml_str("kind: electre\n").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProblemFile);
    }

    #[test]
    fn missing_file_is_a_problem_file_error() {
        let err = ProblemFile::from_path(Path::new("/nonexistent/problem.yaml")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProblemFile);
        assert!(err.to_string().contains("/nonexistent/problem.yaml"));
    }

    #[test]
    fn render_uses_title() {
        let file = ProblemFile::from_yaml_str(AHP_YAML).unwrap();
        let outcome = file.problem.solve(&AnalysisConfig::default()).unwrap();
        let text = outcome.render(&file.display_title());
        assert!(text.contains("Vendor criteria"));
        assert!(text.contains("Quality"));
    }
}
