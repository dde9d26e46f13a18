use thiserror::Error;

/// Failures that abort a single solve. Unboundedness is not an error; it is
/// reported through [`crate::SolutionStatus::Unbounded`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Constraint {constraint} has negative right-hand side {rhs}; the all-slack start is infeasible")]
    InputInfeasibleStart { constraint: String, rhs: f64 },
    #[error("Row {row} has {found} coefficients but the problem declares {expected} variables")]
    DimensionMismatch {
        row: String,
        expected: usize,
        found: usize,
    },
    #[error("Row {row} contains the non-finite value {value}")]
    NonFiniteValue { row: String, value: f64 },
    #[error("No optimum after {iterations} pivots; the tableau is probably cycling")]
    CyclingSuspected { iterations: usize },
}
