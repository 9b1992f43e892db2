//! DEA Analyzer - CCR efficiency of decision making units via linear programming.
//!
//! Each DMU is scored by one LP over the intensity weights λ of all DMUs.
//! Output orientation asks how far outputs could expand at fixed inputs
//! (φ ≥ 1, efficiency 1/φ); input orientation asks how far inputs could
//! shrink at fixed outputs (θ ≤ 1, efficiency θ). Constant returns to scale.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::lp::{Constraint, LinearProgram, LpSolution, Relation, Sense, VarId};
use super::matrix::{default_names, descending_order, ensure_positive};
use crate::domain::foundation::{AnalysisError, Orientation};

/// A DMU is on the frontier when its efficiency is within this distance of 1.
pub const FRONTIER_TOLERANCE: f64 = 1e-6;

/// Minimum λ for a DMU to count as a peer.
pub const PEER_THRESHOLD: f64 = 1e-6;

/// Relative magnitude below which a slack is solver noise and reported as 0.
const SLACK_NOISE: f64 = 1e-9;

/// Outcome of the LP for one DMU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeaStatus {
    Optimal,
    Failed { reason: String },
}

impl DeaStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, DeaStatus::Optimal)
    }
}

impl std::fmt::Display for DeaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeaStatus::Optimal => write!(f, "optimal"),
            DeaStatus::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Optimal LP values for one DMU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeaSolution {
    /// Score in (0, 1]; 1 means on the frontier.
    pub efficiency: f64,
    /// Raw LP score: φ for output orientation, θ for input orientation.
    pub score: f64,
    pub lambdas: Vec<f64>,
    /// Target input minus peer-blend input usage (θ-scaled under input
    /// orientation). Never negative at an optimum.
    pub slack_inputs: Vec<f64>,
    /// Output orientation: φ × target output minus peer-blend output, which is
    /// zero or negative. Input orientation: peer-blend output minus target
    /// output, zero or positive. Residuals within solver noise are reported as 0.
    pub slack_outputs: Vec<f64>,
    pub is_efficient: bool,
    /// DMUs with λ above [`PEER_THRESHOLD`].
    pub peers: Vec<usize>,
    pub iterations: usize,
}

/// Efficiency result for one DMU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeaResult {
    pub dmu_index: usize,
    pub orientation: Orientation,
    pub status: DeaStatus,
    pub solution: Option<DeaSolution>,
}

impl DeaResult {
    pub fn efficiency(&self) -> Option<f64> {
        self.solution.as_ref().map(|s| s.efficiency)
    }

    pub fn is_efficient(&self) -> bool {
        self.solution.as_ref().is_some_and(|s| s.is_efficient)
    }

    pub fn is_failed(&self) -> bool {
        self.solution.is_none()
    }

    pub fn peers(&self) -> &[usize] {
        self.solution.as_ref().map(|s| s.peers.as_slice()).unwrap_or(&[])
    }
}

/// What an inefficient DMU must change to reach the frontier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "orientation", rename_all = "lowercase")]
pub enum TargetAdjustment {
    Output {
        current_outputs: Vec<f64>,
        target_outputs: Vec<f64>,
        improvement_needed: Vec<f64>,
        improvement_percent: f64,
    },
    Input {
        current_inputs: Vec<f64>,
        target_inputs: Vec<f64>,
        reduction_needed: Vec<f64>,
        reduction_percent: f64,
    },
}

impl TargetAdjustment {
    /// Improvement (output) or reduction (input) as a percentage.
    pub fn percent(&self) -> f64 {
        match self {
            TargetAdjustment::Output {
                improvement_percent,
                ..
            } => *improvement_percent,
            TargetAdjustment::Input {
                reduction_percent, ..
            } => *reduction_percent,
        }
    }
}

/// Improvement target for one inefficient DMU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementTarget {
    pub dmu_index: usize,
    pub name: String,
    pub adjustment: TargetAdjustment,
}

/// Efficiency of every DMU in a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeaSweep {
    pub orientation: Orientation,
    pub names: Vec<String>,
    /// One score per DMU; failed DMUs score 0.
    pub efficiencies: Vec<f64>,
    pub results: Vec<DeaResult>,
    /// Indices of DMUs on the frontier.
    pub frontier: Vec<usize>,
    /// Indices by descending efficiency; ties keep index order.
    pub ranking: Vec<usize>,
    pub ranked_names: Vec<String>,
    pub improvement_targets: Vec<ImprovementTarget>,
    /// DMUs whose LP did not solve.
    pub failed_dmus: Vec<usize>,
}

impl DeaSweep {
    /// Names of the frontier DMUs.
    pub fn frontier_names(&self) -> Vec<&str> {
        self.frontier.iter().map(|&i| self.names[i].as_str()).collect()
    }

    /// Improvement target for a DMU, if it has one.
    pub fn target_for(&self, dmu_index: usize) -> Option<&ImprovementTarget> {
        self.improvement_targets
            .iter()
            .find(|t| t.dmu_index == dmu_index)
    }
}

/// Data Envelopment Analysis functions.
pub struct DeaAnalyzer;

impl DeaAnalyzer {
    /// Scores one DMU.
    ///
    /// `inputs` is DMUs × inputs and `outputs` is DMUs × outputs; every entry
    /// must be strictly positive. A solver failure is returned as a
    /// [`DeaStatus::Failed`] result, not as an error.
    ///
    /// # Errors
    /// - empty, non-finite or non-positive data
    /// - input and output row counts differ
    /// - `dmu_index` out of range
    pub fn efficiency(
        inputs: &DMatrix<f64>,
        outputs: &DMatrix<f64>,
        dmu_index: usize,
        orientation: Orientation,
    ) -> Result<DeaResult, AnalysisError> {
        Self::validate(inputs, outputs)?;
        if dmu_index >= inputs.nrows() {
            return Err(AnalysisError::index_out_of_range(
                "dmu_index",
                dmu_index,
                inputs.nrows(),
            ));
        }
        Ok(Self::solve_dmu(inputs, outputs, dmu_index, orientation))
    }

    /// Scores every DMU and derives frontier, ranking and improvement targets.
    ///
    /// Without names, DMUs are labelled `DMU_{i}`.
    pub fn efficiency_all(
        inputs: &DMatrix<f64>,
        outputs: &DMatrix<f64>,
        names: Option<&[String]>,
        orientation: Orientation,
    ) -> Result<DeaSweep, AnalysisError> {
        Self::validate(inputs, outputs)?;
        let n = inputs.nrows();
        let names = match names {
            Some(names) if names.len() != n => {
                return Err(AnalysisError::dimension_mismatch("dmu_names", n, names.len()))
            }
            Some(names) => names.to_vec(),
            None => default_names("DMU", n),
        };

        let results: Vec<DeaResult> = (0..n)
            .map(|k| Self::solve_dmu(inputs, outputs, k, orientation))
            .collect();

        Ok(Self::summarize(inputs, outputs, names, orientation, results))
    }

    /// Aggregates per-DMU results into efficiencies, frontier, ranking,
    /// improvement targets and the failed list. Failed DMUs score 0.
    fn summarize(
        inputs: &DMatrix<f64>,
        outputs: &DMatrix<f64>,
        names: Vec<String>,
        orientation: Orientation,
        results: Vec<DeaResult>,
    ) -> DeaSweep {
        let efficiencies: Vec<f64> = results
            .iter()
            .map(|r| r.efficiency().unwrap_or(0.0))
            .collect();
        let failed_dmus: Vec<usize> = results
            .iter()
            .filter(|r| r.is_failed())
            .map(|r| r.dmu_index)
            .collect();
        let frontier: Vec<usize> = results
            .iter()
            .filter(|r| r.is_efficient())
            .map(|r| r.dmu_index)
            .collect();
        let ranking = descending_order(&efficiencies);
        let ranked_names = ranking.iter().map(|&i| names[i].clone()).collect();

        let improvement_targets = results
            .iter()
            .filter_map(|r| {
                let solution = r.solution.as_ref().filter(|s| !s.is_efficient)?;
                Some(ImprovementTarget {
                    dmu_index: r.dmu_index,
                    name: names[r.dmu_index].clone(),
                    adjustment: Self::adjustment(inputs, outputs, r.dmu_index, orientation, solution),
                })
            })
            .collect();

        debug!(
            dmus = results.len(),
            orientation = %orientation,
            frontier = frontier.len(),
            failed = failed_dmus.len(),
            "DEA sweep complete"
        );

        DeaSweep {
            orientation,
            names,
            efficiencies,
            results,
            frontier,
            ranking,
            ranked_names,
            improvement_targets,
            failed_dmus,
        }
    }

    fn validate(inputs: &DMatrix<f64>, outputs: &DMatrix<f64>) -> Result<(), AnalysisError> {
        ensure_positive("inputs", inputs)?;
        ensure_positive("outputs", outputs)?;
        if inputs.nrows() != outputs.nrows() {
            return Err(AnalysisError::dimension_mismatch(
                "outputs rows",
                inputs.nrows(),
                outputs.nrows(),
            ));
        }
        Ok(())
    }

    fn solve_dmu(
        inputs: &DMatrix<f64>,
        outputs: &DMatrix<f64>,
        k: usize,
        orientation: Orientation,
    ) -> DeaResult {
        let (program, score_var, lambda_vars) = Self::build_program(inputs, outputs, k, orientation);

        match program.solve() {
            Ok(lp) => {
                let solution = Self::interpret(inputs, outputs, k, orientation, &lp, score_var, &lambda_vars);
                debug!(
                    dmu = k,
                    efficiency = solution.efficiency,
                    peers = ?solution.peers,
                    "DEA efficiency computed"
                );
                DeaResult {
                    dmu_index: k,
                    orientation,
                    status: DeaStatus::Optimal,
                    solution: Some(solution),
                }
            }
            Err(e) => {
                warn!(dmu = k, error = %e, "DEA linear program failed");
                DeaResult {
                    dmu_index: k,
                    orientation,
                    status: DeaStatus::Failed {
                        reason: e.to_string(),
                    },
                    solution: None,
                }
            }
        }
    }

    /// Builds the CCR envelopment program for DMU `k`.
    ///
    /// Output: max φ, φ ≥ 1, λ ≥ 0,
    ///   Σ_j λ_j x_ij ≤ x_ik and Σ_j λ_j y_rj − φ y_rk ≥ 0.
    /// Input: min θ, 0 ≤ θ ≤ 1, λ ≥ 0,
    ///   Σ_j λ_j x_ij − θ x_ik ≤ 0 and Σ_j λ_j y_rj ≥ y_rk.
    fn build_program(
        inputs: &DMatrix<f64>,
        outputs: &DMatrix<f64>,
        k: usize,
        orientation: Orientation,
    ) -> (LinearProgram, VarId, Vec<VarId>) {
        let n = inputs.nrows();
        let mut program = match orientation {
            Orientation::Output => LinearProgram::new(Sense::Maximize),
            Orientation::Input => LinearProgram::new(Sense::Minimize),
        };

        let score = match orientation {
            Orientation::Output => program.add_variable("phi", 1.0, None),
            Orientation::Input => program.add_variable("theta", 0.0, Some(1.0)),
        };
        program.set_objective(score, 1.0);
        let lambdas: Vec<VarId> = (0..n)
            .map(|j| program.add_variable(format!("lambda_{j}"), 0.0, None))
            .collect();

        for (i, column) in inputs.column_iter().enumerate() {
            let mut terms: Vec<(VarId, f64)> =
                lambdas.iter().zip(column.iter()).map(|(&v, &x)| (v, x)).collect();
            let rhs = match orientation {
                Orientation::Output => column[k],
                Orientation::Input => {
                    terms.push((score, -column[k]));
                    0.0
                }
            };
            program.add_constraint(Constraint::new(format!("input_{i}"), terms, Relation::LessEq, rhs));
        }

        for (r, column) in outputs.column_iter().enumerate() {
            let mut terms: Vec<(VarId, f64)> =
                lambdas.iter().zip(column.iter()).map(|(&v, &y)| (v, y)).collect();
            let rhs = match orientation {
                Orientation::Output => {
                    terms.push((score, -column[k]));
                    0.0
                }
                Orientation::Input => column[k],
            };
            program.add_constraint(Constraint::new(
                format!("output_{r}"),
                terms,
                Relation::GreaterEq,
                rhs,
            ));
        }

        (program, score, lambdas)
    }

    fn interpret(
        inputs: &DMatrix<f64>,
        outputs: &DMatrix<f64>,
        k: usize,
        orientation: Orientation,
        lp: &LpSolution,
        score_var: VarId,
        lambda_vars: &[VarId],
    ) -> DeaSolution {
        let score = lp.value(score_var);
        let lambdas: Vec<f64> = lambda_vars.iter().map(|&v| lp.value(v)).collect();
        let efficiency = match orientation {
            Orientation::Output => 1.0 / score,
            Orientation::Input => score,
        };

        let blend = |data: &DMatrix<f64>, col: usize| -> f64 {
            lambdas.iter().enumerate().map(|(j, l)| l * data[(j, col)]).sum()
        };

        let slack_inputs = (0..inputs.ncols())
            .map(|i| {
                let own = match orientation {
                    Orientation::Output => inputs[(k, i)],
                    Orientation::Input => score * inputs[(k, i)],
                };
                clamp_noise(own - blend(inputs, i), own)
            })
            .collect();
        let slack_outputs = (0..outputs.ncols())
            .map(|r| match orientation {
                Orientation::Output => {
                    let own = score * outputs[(k, r)];
                    clamp_noise(own - blend(outputs, r), own)
                }
                Orientation::Input => {
                    let own = outputs[(k, r)];
                    clamp_noise(blend(outputs, r) - own, own)
                }
            })
            .collect();

        let peers = lambdas
            .iter()
            .enumerate()
            .filter(|(_, &l)| l > PEER_THRESHOLD)
            .map(|(j, _)| j)
            .collect();

        DeaSolution {
            efficiency,
            score,
            is_efficient: (efficiency - 1.0).abs() <= FRONTIER_TOLERANCE,
            lambdas,
            slack_inputs,
            slack_outputs,
            peers,
            iterations: lp.iterations,
        }
    }

    fn adjustment(
        inputs: &DMatrix<f64>,
        outputs: &DMatrix<f64>,
        k: usize,
        orientation: Orientation,
        solution: &DeaSolution,
    ) -> TargetAdjustment {
        let score = solution.score;
        match orientation {
            Orientation::Output => {
                let current: Vec<f64> = outputs.row(k).iter().copied().collect();
                let target: Vec<f64> = current.iter().map(|y| y * score).collect();
                TargetAdjustment::Output {
                    improvement_needed: target.iter().zip(&current).map(|(t, c)| t - c).collect(),
                    current_outputs: current,
                    target_outputs: target,
                    improvement_percent: (score - 1.0) * 100.0,
                }
            }
            Orientation::Input => {
                let current: Vec<f64> = inputs.row(k).iter().copied().collect();
                let target: Vec<f64> = current.iter().map(|x| x * score).collect();
                TargetAdjustment::Input {
                    reduction_needed: current.iter().zip(&target).map(|(c, t)| c - t).collect(),
                    current_inputs: current,
                    target_inputs: target,
                    reduction_percent: (1.0 - score) * 100.0,
                }
            }
        }
    }
}

fn clamp_noise(value: f64, reference: f64) -> f64 {
    if value.abs() <= SLACK_NOISE * (1.0 + reference.abs()) {
        0.0
    } else {
        value
    }
}
