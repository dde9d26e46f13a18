use easylp_solver::{LpProblem, Sense};
use indexmap::IndexSet;
use thiserror::Error;

use crate::ast::*;
use crate::parser::{ParseError, Parser};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(
        "Unsupported constraint '{constraint}': '{relation}' rows need a non-positive right-hand side"
    )]
    UnsupportedRelation { constraint: String, relation: Relation },
    #[error("Objective name '{0}' cannot be used as a variable in a constraint")]
    ObjectiveNameReused(String),
}

/// A problem lowered to the solver's input form, plus what the user wrote
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProblem {
    pub line: usize,
    pub objective_name: String,
    pub sense: Sense,
    pub objective_text: String,
    /// Constraint lines as written, one per row of `lp_problem`
    pub constraint_sources: Vec<String>,
    pub lp_problem: LpProblem,
}

impl CompiledProblem {
    /// `Maximize: z = 5x1 + 4x2`
    pub fn heading(&self) -> String {
        let keyword = match self.sense {
            Sense::Maximize => "Maximize",
            Sense::Minimize => "Minimize",
        };
        format!("{}: {} = {}", keyword, self.objective_name, self.objective_text)
    }
}

/// Parses and compiles every problem in `source`. Each entry succeeds or
/// fails on its own.
pub fn compile_source(source: &str) -> Vec<Result<CompiledProblem, CompileError>> {
    Parser::parse_each(source)
        .into_iter()
        .map(|parsed| compile(&parsed?))
        .collect()
}

pub fn compile(problem: &Problem) -> Result<CompiledProblem, CompileError> {
    let objective_name = problem.objective_name().to_string();

    let mut constraints = Vec::new();
    for constraint in &problem.constraints {
        if constraint
            .lhs
            .terms
            .iter()
            .any(|t| t.variable == objective_name)
        {
            return Err(CompileError::ObjectiveNameReused(objective_name));
        }
        if constraint.is_sign_declaration() {
            log::info!(
                "line {}: '{}' restates non-negativity, skipped",
                constraint.line,
                constraint
            );
            continue;
        }
        constraints.push(constraint);
    }
    for declaration in &problem.sign_declarations {
        log::info!(
            "line {}: sign declaration for {} skipped",
            declaration.line,
            declaration.variables.join(", ")
        );
    }

    // First-seen order, objective first
    let mut variables: IndexSet<String> = IndexSet::new();
    let terms = problem
        .objective
        .terms
        .iter()
        .chain(constraints.iter().flat_map(|c| c.lhs.terms.iter()));
    for term in terms {
        variables.insert(term.variable.clone());
    }

    let mut lp_problem = LpProblem::new(variables.iter().cloned().collect());
    lp_problem.set_objective(coefficients(&problem.objective, &variables), problem.sense);

    let mut constraint_sources = Vec::new();
    for constraint in constraints {
        let mut row = coefficients(&constraint.lhs, &variables);
        let mut rhs = constraint.rhs;

        match constraint.relation {
            Relation::Le => {}
            Relation::Ge if rhs <= 0.0 => {
                log::info!(
                    "line {}: '{}' multiplied by -1 to become a <= row",
                    constraint.line,
                    constraint
                );
                row.iter_mut().for_each(|c| *c = 0.0 - *c);
                rhs = 0.0 - rhs;
            }
            relation => {
                return Err(CompileError::UnsupportedRelation {
                    constraint: constraint.to_string(),
                    relation,
                });
            }
        }

        let name = format!("c{}", constraint_sources.len() + 1);
        lp_problem.add_constraint(name, row, rhs);
        constraint_sources.push(constraint.to_string());
    }

    Ok(CompiledProblem {
        line: problem.line,
        objective_name,
        sense: problem.sense,
        objective_text: problem.objective.to_string(),
        constraint_sources,
        lp_problem,
    })
}

/// Dense coefficients of `expr` over `variables`; repeated terms add up
fn coefficients(expr: &LinearExpr, variables: &IndexSet<String>) -> Vec<f64> {
    let mut row = vec![0.0; variables.len()];
    for term in &expr.terms {
        if let Some(j) = variables.get_index_of(&term.variable) {
            row[j] += term.coefficient;
        }
    }
    row
}
