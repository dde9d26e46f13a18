use crate::pivot::PivotDecision;
use crate::solution::SolutionStatus;
use crate::tableau::Tableau;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Another pivot is needed
    Continue,
    OptimalUnique,
    /// Optimal, and some non-basic column has a zero reduced cost
    OptimalAlternate,
    Unbounded,
}

impl Termination {
    pub fn is_terminal(self) -> bool {
        self != Termination::Continue
    }

    pub fn status(self) -> Option<SolutionStatus> {
        match self {
            Termination::Continue => None,
            Termination::OptimalUnique => Some(SolutionStatus::OptimalUnique),
            Termination::OptimalAlternate => Some(SolutionStatus::OptimalAlternate),
            Termination::Unbounded => Some(SolutionStatus::Unbounded),
        }
    }
}

pub fn classify(tableau: &Tableau, decision: &PivotDecision, tolerance: f64) -> Termination {
    match decision {
        PivotDecision::Unbounded { .. } => Termination::Unbounded,
        PivotDecision::Pivot { .. } => Termination::Continue,
        PivotDecision::Optimal => {
            if zero_reduced_cost_columns(tableau, tolerance).is_empty() {
                Termination::OptimalUnique
            } else {
                Termination::OptimalAlternate
            }
        }
    }
}

/// Non-basic columns whose objective-row entry is zero, in index order
pub(crate) fn zero_reduced_cost_columns(tableau: &Tableau, tolerance: f64) -> Vec<usize> {
    tableau
        .non_basic_columns()
        .filter(|&j| tableau.reduced_cost(j).abs() <= tolerance)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::select;
    use crate::problem::{LpProblem, Sense};

    const TOL: f64 = 1e-9;

    fn single_row(objective: Vec<f64>, row: Vec<f64>, rhs: f64) -> Tableau {
        let mut problem = LpProblem::new((1..=objective.len()).map(|j| format!("x{}", j)).collect());
        problem.set_objective(objective, Sense::Maximize);
        problem.add_constraint("c1", row, rhs);
        Tableau::standard_form(&problem).unwrap()
    }

    #[test]
    fn test_initial_tableau_continues() {
        let tableau = single_row(vec![1.0, 2.0], vec![1.0, 1.0], 4.0);
        let decision = select(&tableau, TOL);
        assert_eq!(classify(&tableau, &decision, TOL), Termination::Continue);
        assert!(!Termination::Continue.is_terminal());
        assert_eq!(Termination::Continue.status(), None);
    }

    #[test]
    fn test_unique_optimum() {
        let mut tableau = single_row(vec![1.0, 2.0], vec![1.0, 1.0], 4.0);
        tableau.pivot(1, 0, TOL);
        let decision = select(&tableau, TOL);
        assert_eq!(decision, PivotDecision::Optimal);
        assert_eq!(classify(&tableau, &decision, TOL), Termination::OptimalUnique);
    }

    #[test]
    fn test_alternate_optimum() {
        let mut tableau = single_row(vec![1.0, 1.0], vec![1.0, 1.0], 4.0);
        tableau.pivot(0, 0, TOL);
        let decision = select(&tableau, TOL);
        assert_eq!(classify(&tableau, &decision, TOL), Termination::OptimalAlternate);
        assert_eq!(zero_reduced_cost_columns(&tableau, TOL), vec![1]);
    }

    #[test]
    fn test_zero_objective_column_at_start_is_alternate() {
        // x2 never affects the objective, so any x2 in [0, 4 - x1] is optimal too
        let tableau = single_row(vec![-1.0, 0.0], vec![1.0, 1.0], 4.0);
        let decision = select(&tableau, TOL);
        assert_eq!(classify(&tableau, &decision, TOL), Termination::OptimalAlternate);
    }

    #[test]
    fn test_unbounded() {
        let tableau = single_row(vec![1.0], vec![-1.0], 1.0);
        let decision = select(&tableau, TOL);
        assert_eq!(classify(&tableau, &decision, TOL), Termination::Unbounded);
        assert_eq!(
            Termination::Unbounded.status(),
            Some(SolutionStatus::Unbounded)
        );
    }
}
