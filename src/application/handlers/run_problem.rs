//! RunProblemHandler - Command handler for problem files.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::application::problem::{ProblemFile, ProblemOutcome};
use crate::config::AnalysisConfig;
use crate::domain::foundation::AnalysisError;

/// Command to solve a YAML or JSON problem file.
#[derive(Debug, Clone)]
pub struct RunProblemCommand {
    pub path: PathBuf,
}

/// Result of solving a problem file.
#[derive(Debug, Clone, Serialize)]
pub struct RunProblemResult {
    pub title: String,
    pub outcome: ProblemOutcome,
    #[serde(skip)]
    pub report: String,
}

/// Handles [`RunProblemCommand`].
///
/// Variations and DEA orientation missing from the file fall back to the
/// configured analysis defaults.
pub struct RunProblemHandler {
    defaults: AnalysisConfig,
}

impl RunProblemHandler {
    /// Creates a new RunProblemHandler.
    pub fn new(defaults: AnalysisConfig) -> Self {
        Self { defaults }
    }

    pub fn handle(&self, cmd: RunProblemCommand) -> Result<RunProblemResult, AnalysisError> {
        debug!(path = %cmd.path.display(), "Running problem file");

        let file = ProblemFile::from_path(&cmd.path)?;
        let title = file.display_title();
        let outcome = file.problem.solve(&self.defaults)?;
        let report = outcome.render(&title);

        info!(title = %title, "Problem solved");
        Ok(RunProblemResult {
            title,
            outcome,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use std::io::Write;

    #[test]
    fn solves_dea_problem_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "kind: dea\ntitle: Branches\ndmus: [North, South]\ninputs: [[1], [2]]\noutputs: [[1], [1]]\norientation: input"
        )
        .unwrap();

        let result = RunProblemHandler::new(AnalysisConfig::default())
            .handle(RunProblemCommand {
                path: file.path().to_path_buf(),
            })
            .unwrap();

        assert_eq!(result.title, "Branches");
        assert!(result.report.contains("Branches"));
        match result.outcome {
            ProblemOutcome::Dea { sweep, .. } => {
                assert_eq!(sweep.frontier_names(), vec!["North"]);
                assert!((sweep.efficiencies[1] - 0.5).abs() < 1e-6);
            }
            other => panic!("expected DEA outcome, got {:?}", other),
        }
    }

    #[test]
    fn malformed_file_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "{{ \"kind\": \"topsis\", ").unwrap();

        let err = RunProblemHandler::new(AnalysisConfig::default())
            .handle(RunProblemCommand {
                path: file.path().to_path_buf(),
            })
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ProblemFile);
    }
}
