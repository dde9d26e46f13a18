use indexmap::IndexMap;

use crate::problem::LpProblem;
use crate::tableau::Tableau;

/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Value of each decision variable, in problem order
    pub values: IndexMap<String, f64>,
    /// Objective value in the problem's own sense (infinite when unbounded)
    pub objective_value: f64,
    /// Slack left in each constraint
    pub slack_values: Vec<f64>,
    /// Some basic variable is zero at this vertex
    pub degenerate: bool,
    /// A second optimal vertex, when the optimum is not unique
    pub alternative: Option<IndexMap<String, f64>>,
    /// Variable whose column showed the objective is unbounded
    pub unbounded_variable: Option<String>,
    /// Detailed analysis
    pub analysis: Analysis,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// A single optimal vertex
    OptimalUnique,
    /// Optimal, with other vertices reaching the same objective value
    OptimalAlternate,
    /// The objective can grow without limit
    Unbounded,
}

/// Detailed analysis of the optimal solution
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    /// Shadow prices (dual values) for each constraint
    /// Indicates how much the objective would change per unit of extra RHS
    pub shadow_prices: Vec<ShadowPrice>,

    /// Reduced costs for each decision variable
    pub reduced_costs: Vec<ReducedCost>,

    /// Which constraints are binding (tight) at optimum
    pub binding_constraints: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowPrice {
    /// Constraint name
    pub constraint: String,
    /// Shadow price value
    pub value: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedCost {
    /// Variable name
    pub variable: String,
    /// Current value in solution
    pub value: f64,
    /// Reduced cost
    pub reduced_cost: f64,
    /// Is this variable in the basis?
    pub is_basic: bool,
}

impl Solution {
    pub fn is_optimal(&self) -> bool {
        matches!(
            self.status,
            SolutionStatus::OptimalUnique | SolutionStatus::OptimalAlternate
        )
    }

    pub fn value(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied()
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionStatus::OptimalUnique => write!(f, "OPTIMAL"),
            SolutionStatus::OptimalAlternate => write!(f, "OPTIMAL (ALTERNATE OPTIMA)"),
            SolutionStatus::Unbounded => write!(f, "UNBOUNDED"),
        }
    }
}

/// Reads the solution off a terminal tableau
pub fn extract(
    tableau: &Tableau,
    status: SolutionStatus,
    problem: &LpProblem,
    tolerance: f64,
) -> Solution {
    let n_vars = tableau.num_decision();
    let factor = problem.sense().factor();

    let values = decision_values(tableau);
    let slack_values: Vec<f64> = (n_vars..tableau.num_columns())
        .map(|j| clean(tableau.value_of(j)))
        .collect();
    let degenerate = (0..tableau.num_constraints()).any(|i| tableau.rhs(i).abs() <= tolerance);

    let objective_value = match status {
        SolutionStatus::Unbounded => factor * f64::INFINITY,
        _ => clean(factor * tableau.objective_value()),
    };

    let analysis = match status {
        SolutionStatus::Unbounded => Analysis::default(),
        _ => analyze(tableau, problem, &slack_values, tolerance),
    };

    Solution {
        status,
        values,
        objective_value,
        slack_values,
        degenerate,
        alternative: None,
        unbounded_variable: None,
        analysis,
    }
}

/// Decision-variable values at the tableau's current vertex
pub(crate) fn decision_values(tableau: &Tableau) -> IndexMap<String, f64> {
    tableau.variables()[..tableau.num_decision()]
        .iter()
        .map(|v| (v.name.clone(), clean(tableau.value_of(v.index))))
        .collect()
}

fn analyze(tableau: &Tableau, problem: &LpProblem, slack_values: &[f64], tolerance: f64) -> Analysis {
    let n_vars = tableau.num_decision();
    let factor = problem.sense().factor();

    // Shadow prices: objective row entries for slack columns
    let shadow_prices = problem
        .constraints
        .iter()
        .enumerate()
        .map(|(i, c)| ShadowPrice {
            constraint: c.name.clone(),
            value: clean(factor * tableau.reduced_cost(n_vars + i)),
        })
        .collect();

    let reduced_costs = problem
        .variables
        .iter()
        .enumerate()
        .map(|(j, name)| ReducedCost {
            variable: name.clone(),
            value: clean(tableau.value_of(j)),
            reduced_cost: clean(factor * tableau.reduced_cost(j)),
            is_basic: tableau.is_basic(j),
        })
        .collect();

    let binding_constraints = problem
        .constraints
        .iter()
        .zip(slack_values)
        .filter(|(_, slack)| slack.abs() <= tolerance)
        .map(|(c, _)| c.name.clone())
        .collect();

    Analysis {
        shadow_prices,
        reduced_costs,
        binding_constraints,
    }
}

/// Folds `-0.0` into `0.0` so printed results never show a signed zero
fn clean(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Sense;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_extract_after_pivots() {
        let mut problem = LpProblem::new(vec!["x1".to_string(), "x2".to_string()]);
        problem.set_objective(vec![5.0, 4.0], Sense::Maximize);
        problem.add_constraint("c1", vec![6.0, 4.0], 24.0);
        problem.add_constraint("c2", vec![1.0, 2.0], 6.0);

        let mut tableau = Tableau::standard_form(&problem).unwrap();
        tableau.pivot(0, 0, TOL);
        tableau.pivot(1, 1, TOL);

        let solution = extract(&tableau, SolutionStatus::OptimalUnique, &problem, TOL);
        assert!(solution.is_optimal());
        assert!((solution.value("x1").unwrap() - 3.0).abs() < 1e-9);
        assert!((solution.value("x2").unwrap() - 1.5).abs() < 1e-9);
        assert!((solution.objective_value - 21.0).abs() < 1e-9);
        assert_eq!(solution.slack_values, vec![0.0, 0.0]);
        assert!(!solution.degenerate);

        let prices: Vec<f64> = solution.analysis.shadow_prices.iter().map(|s| s.value).collect();
        assert!((prices[0] - 0.75).abs() < 1e-9);
        assert!((prices[1] - 0.5).abs() < 1e-9);
        assert_eq!(solution.analysis.binding_constraints, vec!["c1", "c2"]);
        assert!(solution.analysis.reduced_costs.iter().all(|rc| rc.is_basic));
    }

    #[test]
    fn test_non_basic_values_are_zero() {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![1.0, 3.0], Sense::Maximize);
        problem.add_constraint("cap", vec![1.0, 1.0], 5.0);
        problem.add_constraint("loose", vec![0.0, 1.0], 9.0);

        let mut tableau = Tableau::standard_form(&problem).unwrap();
        tableau.pivot(1, 0, TOL);

        let solution = extract(&tableau, SolutionStatus::OptimalUnique, &problem, TOL);
        assert_eq!(solution.value("x"), Some(0.0));
        assert_eq!(solution.value("y"), Some(5.0));
        assert_eq!(solution.value("z"), None);
        assert_eq!(solution.slack_values, vec![0.0, 4.0]);
        assert_eq!(solution.analysis.binding_constraints, vec!["cap"]);

        let x = &solution.analysis.reduced_costs[0];
        assert!(!x.is_basic);
        assert!((x.reduced_cost - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_minimize_reports_original_sense() {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![-2.0, -3.0], Sense::Minimize);
        problem.add_constraint("cap", vec![1.0, 1.0], 4.0);

        let mut tableau = Tableau::standard_form(&problem).unwrap();
        tableau.pivot(1, 0, TOL);

        let solution = extract(&tableau, SolutionStatus::OptimalUnique, &problem, TOL);
        assert!((solution.objective_value + 12.0).abs() < 1e-9);
        // One more unit of capacity lowers the minimum by 3
        assert!((solution.analysis.shadow_prices[0].value + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_signed_zero_is_cleaned() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![2.0], Sense::Minimize);
        problem.add_constraint("cap", vec![1.0], 4.0);

        let tableau = Tableau::standard_form(&problem).unwrap();
        let solution = extract(&tableau, SolutionStatus::OptimalUnique, &problem, TOL);
        assert_eq!(solution.objective_value, 0.0);
        assert!(solution.objective_value.is_sign_positive());
    }

    #[test]
    fn test_unbounded_objective_is_infinite() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![-1.0], Sense::Minimize);
        problem.add_constraint("c", vec![-1.0], 1.0);

        let tableau = Tableau::standard_form(&problem).unwrap();
        let solution = extract(&tableau, SolutionStatus::Unbounded, &problem, TOL);
        assert_eq!(solution.objective_value, f64::NEG_INFINITY);
        assert!(!solution.is_optimal());
        assert!(solution.analysis.shadow_prices.is_empty());
    }
}
