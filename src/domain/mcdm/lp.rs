//! Linear Program - Declarative model and a dense two-phase simplex solver.
//!
//! A program is a list of bounded variables, an objective, and a list of
//! `(expression, relation, rhs)` constraints. Solving converts the model to
//! standard form (shifted lower bounds, upper bounds as rows, non-negative
//! right-hand sides), finds a feasible basis with a phase-one artificial
//! objective, then optimizes the real objective. Bland's rule is used for
//! both entering and leaving variables, so the method cannot cycle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Variable identifier (index into the program's variable list).
pub type VarId = usize;

/// Pivot tolerance for reduced costs and column entries.
const PIVOT_TOLERANCE: f64 = 1e-9;

/// Relative tolerance on the phase-one objective.
const FEASIBILITY_TOLERANCE: f64 = 1e-7;

/// Default iteration cap across both phases.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Objective direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// Constraint relation between an expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

impl Relation {
    fn flipped(self) -> Self {
        match self {
            Relation::LessEq => Relation::GreaterEq,
            Relation::GreaterEq => Relation::LessEq,
            Relation::Equal => Relation::Equal,
        }
    }
}

/// A decision variable with a finite lower bound and optional upper bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: Option<f64>,
}

/// A linear constraint: Σ coefficient·variable (relation) rhs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    /// Creates a new constraint.
    pub fn new(
        name: impl Into<String>,
        terms: Vec<(VarId, f64)>,
        relation: Relation,
        rhs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            terms,
            relation,
            rhs,
        }
    }
}

/// Reasons a program has no optimal solution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    #[error("problem is infeasible")]
    Infeasible,

    #[error("problem is unbounded")]
    Unbounded,

    #[error("iteration limit of {0} reached")]
    IterationLimit(usize),

    #[error("malformed program: {0}")]
    Malformed(String),
}

/// Optimal solution of a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpSolution {
    /// Value of every variable, in declaration order.
    pub values: Vec<f64>,
    /// Objective value at the optimum (in the program's own sense).
    pub objective: f64,
    /// Simplex pivots performed across both phases.
    pub iterations: usize,
}

impl LpSolution {
    /// Returns the value of a variable.
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var]
    }
}

/// A linear program in declarative form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProgram {
    sense: Sense,
    variables: Vec<Variable>,
    objective: Vec<f64>,
    constraints: Vec<Constraint>,
    max_iterations: usize,
}

impl LinearProgram {
    /// Creates an empty program.
    pub fn new(sense: Sense) -> Self {
        Self {
            sense,
            variables: Vec::new(),
            objective: Vec::new(),
            constraints: Vec::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Overrides the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Adds a variable and returns its identifier.
    pub fn add_variable(&mut self, name: impl Into<String>, lower: f64, upper: Option<f64>) -> VarId {
        self.variables.push(Variable {
            name: name.into(),
            lower,
            upper,
        });
        self.objective.push(0.0);
        self.variables.len() - 1
    }

    /// Sets the objective coefficient of a variable.
    pub fn set_objective(&mut self, var: VarId, coefficient: f64) {
        if let Some(c) = self.objective.get_mut(var) {
            *c = coefficient;
        }
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Solves the program.
    ///
    /// # Errors
    /// - `Malformed`: unknown variable ids, non-finite data, or bad bounds
    /// - `Infeasible`: no point satisfies every constraint and bound
    /// - `Unbounded`: the objective improves without limit
    /// - `IterationLimit`: the pivot cap was reached
    pub fn solve(&self) -> Result<LpSolution, SolveError> {
        self.validate()?;

        let n = self.variables.len();
        let rows = self.standard_rows();
        let m = rows.len();

        let num_slack = rows.iter().filter(|r| r.relation != Relation::Equal).count();
        let num_artificial = rows.iter().filter(|r| r.relation != Relation::LessEq).count();
        let num_cols = n + num_slack + num_artificial;

        let mut table = vec![vec![0.0; num_cols + 1]; m];
        let mut basis = vec![0; m];
        let mut is_artificial = vec![false; num_cols];
        let mut next_slack = n;
        let mut next_artificial = n + num_slack;

        for (r, row) in rows.iter().enumerate() {
            table[r][..n].copy_from_slice(&row.coefficients);
            table[r][num_cols] = row.rhs;
            match row.relation {
                Relation::LessEq => {
                    table[r][next_slack] = 1.0;
                    basis[r] = next_slack;
                    next_slack += 1;
                }
                Relation::GreaterEq => {
                    table[r][next_slack] = -1.0;
                    next_slack += 1;
                    table[r][next_artificial] = 1.0;
                    basis[r] = next_artificial;
                    is_artificial[next_artificial] = true;
                    next_artificial += 1;
                }
                Relation::Equal => {
                    table[r][next_artificial] = 1.0;
                    basis[r] = next_artificial;
                    is_artificial[next_artificial] = true;
                    next_artificial += 1;
                }
            }
        }

        let mut tableau = Tableau {
            rows: table,
            basis,
            num_cols,
            iterations: 0,
            max_iterations: self.max_iterations,
        };

        if num_artificial > 0 {
            let phase_one_cost: Vec<f64> = is_artificial
                .iter()
                .map(|&a| if a { 1.0 } else { 0.0 })
                .collect();
            let everything = vec![true; num_cols];
            match tableau.minimize(&phase_one_cost, &everything) {
                Ok(()) => {}
                // Phase one is bounded below by zero.
                Err(SolveError::Unbounded) => return Err(SolveError::Infeasible),
                Err(e) => return Err(e),
            }

            let scale = rows.iter().map(|r| r.rhs.abs()).fold(1.0, f64::max);
            let infeasibility: f64 = (0..m)
                .filter(|&r| is_artificial[tableau.basis[r]])
                .map(|r| tableau.rhs(r))
                .sum();
            if infeasibility > FEASIBILITY_TOLERANCE * scale {
                return Err(SolveError::Infeasible);
            }
            tableau.drive_out_artificials(&is_artificial);
        }

        let sign = match self.sense {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };
        let mut cost = vec![0.0; num_cols];
        for (c, coefficient) in cost.iter_mut().zip(&self.objective) {
            *c = sign * coefficient;
        }
        let allowed: Vec<bool> = is_artificial.iter().map(|a| !a).collect();
        tableau.minimize(&cost, &allowed)?;

        let mut values: Vec<f64> = self.variables.iter().map(|v| v.lower).collect();
        for (r, &b) in tableau.basis.iter().enumerate() {
            if b < n {
                values[b] += tableau.rhs(r);
            }
        }
        let objective = values
            .iter()
            .zip(&self.objective)
            .map(|(x, c)| x * c)
            .sum();

        Ok(LpSolution {
            values,
            objective,
            iterations: tableau.iterations,
        })
    }

    fn validate(&self) -> Result<(), SolveError> {
        for v in &self.variables {
            if !v.lower.is_finite() {
                return Err(SolveError::Malformed(format!(
                    "variable '{}' needs a finite lower bound",
                    v.name
                )));
            }
            if let Some(upper) = v.upper {
                if !upper.is_finite() || upper < v.lower {
                    return Err(SolveError::Malformed(format!(
                        "variable '{}' has upper bound {} below lower bound {}",
                        v.name, upper, v.lower
                    )));
                }
            }
        }
        if self.objective.iter().any(|c| !c.is_finite()) {
            return Err(SolveError::Malformed("non-finite objective coefficient".into()));
        }
        for c in &self.constraints {
            if !c.rhs.is_finite() {
                return Err(SolveError::Malformed(format!(
                    "constraint '{}' has a non-finite rhs",
                    c.name
                )));
            }
            for &(var, coefficient) in &c.terms {
                if var >= self.variables.len() {
                    return Err(SolveError::Malformed(format!(
                        "constraint '{}' references unknown variable {}",
                        c.name, var
                    )));
                }
                if !coefficient.is_finite() {
                    return Err(SolveError::Malformed(format!(
                        "constraint '{}' has a non-finite coefficient",
                        c.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Rows over the shifted variables `y = x - lower >= 0`, with rhs >= 0.
    fn standard_rows(&self) -> Vec<StandardRow> {
        let n = self.variables.len();
        let mut rows = Vec::with_capacity(self.constraints.len() + n);

        for c in &self.constraints {
            let mut coefficients = vec![0.0; n];
            for &(var, a) in &c.terms {
                coefficients[var] += a;
            }
            let shift: f64 = coefficients
                .iter()
                .zip(&self.variables)
                .map(|(a, v)| a * v.lower)
                .sum();
            rows.push(StandardRow {
                coefficients,
                relation: c.relation,
                rhs: c.rhs - shift,
            });
        }

        for (var, v) in self.variables.iter().enumerate() {
            if let Some(upper) = v.upper {
                let mut coefficients = vec![0.0; n];
                coefficients[var] = 1.0;
                rows.push(StandardRow {
                    coefficients,
                    relation: Relation::LessEq,
                    rhs: upper - v.lower,
                });
            }
        }

        for row in &mut rows {
            if row.rhs < 0.0 {
                row.coefficients.iter_mut().for_each(|a| *a = -*a);
                row.rhs = -row.rhs;
                row.relation = row.relation.flipped();
            }
        }

        rows
    }
}

struct StandardRow {
    coefficients: Vec<f64>,
    relation: Relation,
    rhs: f64,
}

/// Dense simplex tableau; the last column of each row is the rhs.
struct Tableau {
    rows: Vec<Vec<f64>>,
    basis: Vec<usize>,
    num_cols: usize,
    iterations: usize,
    max_iterations: usize,
}

impl Tableau {
    fn rhs(&self, r: usize) -> f64 {
        self.rows[r][self.num_cols]
    }

    fn reduced_cost(&self, cost: &[f64], col: usize) -> f64 {
        let basic: f64 = self
            .rows
            .iter()
            .zip(&self.basis)
            .map(|(row, &b)| cost[b] * row[col])
            .sum();
        cost[col] - basic
    }

    /// Minimizes `cost·x`, entering only columns marked in `allowed`.
    fn minimize(&mut self, cost: &[f64], allowed: &[bool]) -> Result<(), SolveError> {
        loop {
            let entering = (0..self.num_cols).find(|&c| {
                allowed[c] && !self.basis.contains(&c) && self.reduced_cost(cost, c) < -PIVOT_TOLERANCE
            });
            let Some(col) = entering else {
                return Ok(());
            };

            let mut leaving: Option<(usize, f64)> = None;
            for r in 0..self.rows.len() {
                let a = self.rows[r][col];
                if a <= PIVOT_TOLERANCE {
                    continue;
                }
                let ratio = self.rhs(r).max(0.0) / a;
                leaving = match leaving {
                    None => Some((r, ratio)),
                    Some((best, best_ratio)) => {
                        if ratio < best_ratio - PIVOT_TOLERANCE
                            || ((ratio - best_ratio).abs() <= PIVOT_TOLERANCE
                                && self.basis[r] < self.basis[best])
                        {
                            Some((r, ratio))
                        } else {
                            Some((best, best_ratio))
                        }
                    }
                };
            }
            let Some((row, _)) = leaving else {
                return Err(SolveError::Unbounded);
            };

            if self.iterations >= self.max_iterations {
                return Err(SolveError::IterationLimit(self.max_iterations));
            }
            self.pivot(row, col);
        }
    }

    /// Pivots zero-valued artificials out of the basis where possible.
    /// Rows with no usable column are redundant and keep their artificial at 0.
    fn drive_out_artificials(&mut self, is_artificial: &[bool]) {
        for r in 0..self.rows.len() {
            if !is_artificial[self.basis[r]] {
                continue;
            }
            let replacement = (0..self.num_cols).find(|&c| {
                !is_artificial[c] && !self.basis.contains(&c) && self.rows[r][c].abs() > PIVOT_TOLERANCE
            });
            if let Some(col) = replacement {
                self.pivot(r, col);
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let p = self.rows[row][col];
        for v in self.rows[row].iter_mut() {
            *v /= p;
        }
        let pivot_row = self.rows[row].clone();
        for (r, current) in self.rows.iter_mut().enumerate() {
            if r == row {
                continue;
            }
            let factor = current[col];
            if factor != 0.0 {
                for (v, pv) in current.iter_mut().zip(&pivot_row) {
                    *v -= factor * pv;
                }
            }
        }
        self.basis[row] = col;
        self.iterations += 1;
    }
}
