//! Linear-program capability used by the allocation solvers.
//!
//! The solvers need exactly one shape of program: minimize a linear
//! objective subject to equality constraints and per-variable box bounds.
//! This crate owns the problem/solution/error types so the backing engine
//! (currently the `minilp` simplex implementation) can be swapped without
//! touching any formulation code.

use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};
use thiserror::Error;

/// Why the backend failed to produce an optimum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LpError {
    #[error("linear program is infeasible")]
    Infeasible,
    #[error("linear program is unbounded")]
    Unbounded,
}

/// Coefficients below this magnitude are treated as structural zeros.
const COEFF_EPSILON: f64 = 1e-12;

/// A dense minimization problem: objective coefficients, box bounds, and
/// equality rows, all indexed by variable column.
#[derive(Debug, Clone, Default)]
pub struct LpProblem {
    objective: Vec<f64>,
    bounds: Vec<(f64, f64)>,
    equalities: Vec<(Vec<f64>, f64)>,
}

/// Optimal value and point returned by [`LpProblem::solve`].
#[derive(Debug, Clone)]
pub struct LpSolution {
    pub objective: f64,
    pub values: Vec<f64>,
}

impl LpProblem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables added so far.
    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    /// Add a variable with the given objective coefficient and `[min, max]`
    /// bounds, returning its column index.
    pub fn add_variable(&mut self, objective: f64, min: f64, max: f64) -> usize {
        self.objective.push(objective);
        self.bounds.push((min, max));
        self.objective.len() - 1
    }

    /// Add an equality row; `coefficients` must have one entry per variable.
    pub fn add_equality(&mut self, coefficients: Vec<f64>, rhs: f64) {
        debug_assert_eq!(coefficients.len(), self.objective.len());
        self.equalities.push((coefficients, rhs));
    }

    /// Minimize the objective.
    ///
    /// Rows whose coefficients are all structural zeros never reach the
    /// backend: a zero row with zero right-hand side is vacuous (a zero
    /// torque arm satisfies its torque constraint identically), while a zero
    /// row with nonzero right-hand side makes the program infeasible without
    /// a solve. A program whose every row was vacuous is solved analytically
    /// at the bounds.
    pub fn solve(&self) -> Result<LpSolution, LpError> {
        let mut active_rows = Vec::new();
        for (coefficients, rhs) in &self.equalities {
            if coefficients.iter().all(|c| c.abs() < COEFF_EPSILON) {
                if rhs.abs() < COEFF_EPSILON {
                    continue;
                }
                return Err(LpError::Infeasible);
            }
            active_rows.push((coefficients, *rhs));
        }

        if active_rows.is_empty() {
            return self.solve_bounds_only();
        }

        let mut problem = Problem::new(OptimizationDirection::Minimize);
        let vars: Vec<_> = self
            .objective
            .iter()
            .zip(&self.bounds)
            .map(|(&obj, &(min, max))| problem.add_var(obj, (min, max)))
            .collect();

        for (coefficients, rhs) in active_rows {
            let mut row = LinearExpr::empty();
            for (&var, &coeff) in vars.iter().zip(coefficients) {
                row.add(var, coeff);
            }
            problem.add_constraint(row, ComparisonOp::Eq, rhs);
        }

        let solution = problem.solve().map_err(|err| match err {
            minilp::Error::Infeasible => LpError::Infeasible,
            minilp::Error::Unbounded => LpError::Unbounded,
        })?;

        Ok(LpSolution {
            objective: solution.objective(),
            values: vars.iter().map(|&var| solution[var]).collect(),
        })
    }

    /// Each variable sits at whichever bound its objective coefficient
    /// favors; zero-coefficient variables rest as close to zero as their
    /// bounds allow.
    fn solve_bounds_only(&self) -> Result<LpSolution, LpError> {
        let mut objective = 0.0;
        let mut values = Vec::with_capacity(self.objective.len());
        for (&coeff, &(min, max)) in self.objective.iter().zip(&self.bounds) {
            let value = if coeff > 0.0 {
                min
            } else if coeff < 0.0 {
                max
            } else {
                0.0_f64.clamp(min, max)
            };
            if !value.is_finite() {
                return Err(LpError::Unbounded);
            }
            objective += coeff * value;
            values.push(value);
        }
        Ok(LpSolution { objective, values })
    }
}
