mod classify;
mod error;
mod pivot;
mod problem;
mod simplex;
mod solution;
mod tableau;
mod variable;

pub use classify::{Termination, classify};
pub use error::SolveError;
pub use pivot::{PivotDecision, PivotRecord, RatioTest, select};
pub use problem::{Constraint, LpProblem, Objective, Sense};
pub use simplex::{SolveReport, Solver};
pub use solution::{Analysis, ReducedCost, ShadowPrice, Solution, SolutionStatus, extract};
pub use tableau::{Tableau, TableauSnapshot};
pub use variable::{Variable, VariableKind};
