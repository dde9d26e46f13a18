use indexmap::IndexMap;

use crate::classify::{classify, zero_reduced_cost_columns};
use crate::error::SolveError;
use crate::pivot::{self, PivotDecision, RatioTest};
use crate::problem::LpProblem;
use crate::solution::{Solution, SolutionStatus, decision_values, extract};
use crate::tableau::{Tableau, TableauSnapshot};

/// Pivots allowed per tableau column before cycling is assumed
const ITERATION_GUARD_FACTOR: usize = 20;

/// Simplex solver for easy-form linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots before giving up; derived from problem size when unset
    max_iterations: Option<usize>,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

/// Everything one solve produced: a snapshot per iteration and the result
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub trace: Vec<TableauSnapshot>,
    pub solution: Solution,
}

impl SolveReport {
    /// Number of pivots performed
    pub fn pivots(&self) -> usize {
        self.trace.len().saturating_sub(1)
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: None,
            tolerance: 1e-9,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Pivot budget for `problem`
    pub fn iteration_limit(&self, problem: &LpProblem) -> usize {
        self.max_iterations.unwrap_or_else(|| {
            let columns = problem.num_variables() + problem.num_constraints();
            ITERATION_GUARD_FACTOR * columns.max(1)
        })
    }

    /// Solve the LP problem with the tableau simplex method
    pub fn solve(&self, problem: &LpProblem) -> Result<SolveReport, SolveError> {
        let mut tableau = Tableau::standard_form(problem)?;
        let limit = self.iteration_limit(problem);
        let mut trace = vec![tableau.snapshot(0, None)];
        let mut iterations = 0;

        let (status, decision) = loop {
            let decision = pivot::select(&tableau, self.tolerance);
            if let Some(status) = classify(&tableau, &decision, self.tolerance).status() {
                break (status, decision);
            }
            if let PivotDecision::Pivot { column, row } = decision {
                if iterations >= limit {
                    log::warn!("giving up after {} pivots without reaching an optimum", iterations);
                    return Err(SolveError::CyclingSuspected { iterations });
                }
                if let Some(current) = trace.last_mut() {
                    current.ratio_test = Some(RatioTest {
                        column,
                        ratios: pivot::ratios(&tableau, column, self.tolerance),
                    });
                }
                let record = tableau.pivot(column, row, self.tolerance);
                iterations += 1;
                trace.push(tableau.snapshot(iterations, Some(record)));
            }
        };

        let mut solution = extract(&tableau, status, problem, self.tolerance);
        match (status, decision) {
            (SolutionStatus::Unbounded, PivotDecision::Unbounded { column }) => {
                solution.unbounded_variable = Some(tableau.variables()[column].name.clone());
            }
            (SolutionStatus::OptimalAlternate, _) => {
                solution.alternative = self.alternative_vertex(&tableau);
            }
            _ => {}
        }

        log::debug!(
            "solved in {} pivots: {} (objective {})",
            iterations,
            solution.status,
            solution.objective_value
        );

        Ok(SolveReport { trace, solution })
    }

    /// Pivots a copy of an optimal tableau on each zero reduced-cost column
    /// until it lands on a different optimal vertex.
    fn alternative_vertex(&self, tableau: &Tableau) -> Option<IndexMap<String, f64>> {
        let current = decision_values(tableau);

        for column in zero_reduced_cost_columns(tableau, self.tolerance) {
            let Some((row, _)) = pivot::leaving_row(tableau, column, self.tolerance) else {
                continue;
            };
            let mut probe = tableau.clone();
            probe.pivot(column, row, self.tolerance);
            let candidate = decision_values(&probe);

            let moved = current
                .values()
                .zip(candidate.values())
                .any(|(a, b)| (a - b).abs() > self.tolerance);
            if moved {
                return Some(candidate);
            }
        }

        None
    }
}
