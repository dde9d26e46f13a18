use crate::error::SolveError;
use crate::pivot::{PivotRecord, RatioTest};
use crate::problem::LpProblem;
use crate::variable::{Variable, slack_name};

/// Simplex tableau for an easy-form LP.
///
/// `data` holds one row per constraint followed by the objective row; every
/// row has one column per variable (decision, then slack) followed by the
/// right-hand side. `basic_vars[i]` is the variable basic in row `i`.
///
/// The objective row is kept in maximization form: an entry below zero marks
/// a column that would improve the objective, and its right-hand side is the
/// current objective value.
///
/// Outside this crate a tableau is read-only; pivots happen inside
/// [`crate::Solver::solve`]:
///
/// ```compile_fail
/// use easylp_solver::{LpProblem, Sense, Tableau};
///
/// let mut problem = LpProblem::new(vec!["x".to_string()]);
/// problem.set_objective(vec![1.0], Sense::Maximize);
/// problem.add_constraint("c1", vec![0.0], 1.0);
/// let mut tableau = Tableau::standard_form(&problem).unwrap();
/// tableau.pivot(0, 0, 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    pub(crate) data: Vec<Vec<f64>>,
    pub(crate) basic_vars: Vec<usize>,
    pub(crate) variables: Vec<Variable>,
    pub(crate) n_decision: usize,
}

/// Read-only copy of a tableau handed to display code.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TableauSnapshot {
    /// Number of pivots performed before this snapshot
    pub iteration: usize,
    /// Column labels, decision variables then slacks
    pub columns: Vec<String>,
    /// Variable index basic in each constraint row
    pub basis: Vec<usize>,
    /// Constraint-row coefficients, without the right-hand side
    pub rows: Vec<Vec<f64>>,
    /// Constraint-row right-hand sides
    pub rhs: Vec<f64>,
    /// Objective-row coefficients (reduced costs), without the right-hand side
    pub objective_row: Vec<f64>,
    /// Objective-row right-hand side, in the tableau's maximization sense
    pub objective_value: f64,
    /// The pivot that produced this tableau
    pub pivot: Option<PivotRecord>,
    /// Ratio test for the pivot taken from this tableau, if any
    pub ratio_test: Option<RatioTest>,
}

impl TableauSnapshot {
    /// Name of the variable basic in each row
    pub fn basic_names(&self) -> Vec<&str> {
        self.basis.iter().map(|&v| self.columns[v].as_str()).collect()
    }
}

impl Tableau {
    /// Builds the initial tableau: one slack per constraint, all slacks basic.
    pub fn standard_form(problem: &LpProblem) -> Result<Self, SolveError> {
        let n_vars = problem.num_variables();
        let n_constraints = problem.num_constraints();

        if problem.objective.coefficients.len() != n_vars {
            return Err(SolveError::DimensionMismatch {
                row: "objective".to_string(),
                expected: n_vars,
                found: problem.objective.coefficients.len(),
            });
        }
        for c in &problem.constraints {
            if c.coefficients.len() != n_vars {
                return Err(SolveError::DimensionMismatch {
                    row: c.name.clone(),
                    expected: n_vars,
                    found: c.coefficients.len(),
                });
            }
        }
        if let Some(&value) = problem.objective.coefficients.iter().find(|v| !v.is_finite()) {
            return Err(SolveError::NonFiniteValue {
                row: "objective".to_string(),
                value,
            });
        }
        for c in &problem.constraints {
            let bad = c.coefficients.iter().chain([&c.rhs]).find(|v| !v.is_finite());
            if let Some(&value) = bad {
                return Err(SolveError::NonFiniteValue {
                    row: c.name.clone(),
                    value,
                });
            }
        }
        if let Some(c) = problem.constraints.iter().find(|c| c.rhs < 0.0) {
            return Err(SolveError::InputInfeasibleStart {
                constraint: c.name.clone(),
                rhs: c.rhs,
            });
        }

        let mut variables: Vec<Variable> = problem
            .variables
            .iter()
            .enumerate()
            .map(|(j, name)| Variable::decision(j, name.clone()))
            .collect();
        for i in 0..n_constraints {
            variables.push(Variable::slack(n_vars + i, slack_name(i, &problem.variables)));
        }

        let total_cols = n_vars + n_constraints + 1; // +1 for RHS
        let total_rows = n_constraints + 1; // +1 for objective
        let mut data = vec![vec![0.0; total_cols]; total_rows];

        for (i, c) in problem.constraints.iter().enumerate() {
            data[i][..n_vars].copy_from_slice(&c.coefficients);
            data[i][n_vars + i] = 1.0;
            data[i][total_cols - 1] = c.rhs;
        }

        // z - c.x = 0, with minimization turned into maximization of -c.x
        let factor = problem.sense().factor();
        let obj_row = n_constraints;
        for (j, &coef) in problem.objective.coefficients.iter().enumerate() {
            data[obj_row][j] = -factor * coef;
        }

        Ok(Tableau {
            data,
            basic_vars: (n_vars..n_vars + n_constraints).collect(),
            variables,
            n_decision: n_vars,
        })
    }

    pub fn num_constraints(&self) -> usize {
        self.data.len() - 1
    }

    /// Number of variable columns (decision + slack)
    pub fn num_columns(&self) -> usize {
        self.variables.len()
    }

    pub fn num_decision(&self) -> usize {
        self.n_decision
    }

    pub(crate) fn rhs_col(&self) -> usize {
        self.variables.len()
    }

    pub(crate) fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    pub fn entry(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.data[row][self.rhs_col()]
    }

    pub fn reduced_cost(&self, col: usize) -> f64 {
        self.data[self.obj_row()][col]
    }

    /// Current objective value, in maximization sense
    pub fn objective_value(&self) -> f64 {
        self.data[self.obj_row()][self.rhs_col()]
    }

    pub fn basis(&self) -> &[usize] {
        &self.basic_vars
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn is_basic(&self, col: usize) -> bool {
        self.basic_vars.contains(&col)
    }

    /// Row in which `var` is basic
    pub fn basic_row(&self, var: usize) -> Option<usize> {
        self.basic_vars.iter().position(|&b| b == var)
    }

    /// Value of any variable (decision or slack) at the current vertex
    pub fn value_of(&self, var: usize) -> f64 {
        self.basic_row(var).map_or(0.0, |row| self.rhs(row))
    }

    pub fn non_basic_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_columns()).filter(|&j| !self.is_basic(j))
    }

    pub fn snapshot(&self, iteration: usize, pivot: Option<PivotRecord>) -> TableauSnapshot {
        let rhs_col = self.rhs_col();
        let obj_row = self.obj_row();
        TableauSnapshot {
            iteration,
            columns: self.variables.iter().map(|v| v.name.clone()).collect(),
            basis: self.basic_vars.clone(),
            rows: self.data[..obj_row]
                .iter()
                .map(|row| row[..rhs_col].to_vec())
                .collect(),
            rhs: self.data[..obj_row].iter().map(|row| row[rhs_col]).collect(),
            objective_row: self.data[obj_row][..rhs_col].to_vec(),
            objective_value: self.data[obj_row][rhs_col],
            pivot,
            ratio_test: None,
        }
    }
}
