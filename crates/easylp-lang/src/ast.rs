use easylp_solver::Sense;

use crate::lexer::Span;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub problems: Vec<Problem>,
}

/// One LP as written: an objective line followed by its constraint lines
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub span: Span,
    pub line: usize,
    pub sense: Sense,
    /// Name on the left of the objective, e.g. `z` in `Maximize: z = ...`
    pub objective_name: Option<String>,
    pub objective: LinearExpr,
    pub constraints: Vec<ConstraintDef>,
    pub sign_declarations: Vec<SignDeclaration>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDef {
    pub span: Span,
    pub line: usize,
    pub lhs: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

/// `x1, x2 >= 0`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SignDeclaration {
    pub span: Span,
    pub line: usize,
    pub variables: Vec<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearExpr {
    pub terms: Vec<Term>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub span: Span,
    pub coefficient: f64,
    pub variable: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

impl ConstraintDef {
    /// `x >= 0` with a unit coefficient only restates non-negativity
    pub fn is_sign_declaration(&self) -> bool {
        self.relation == Relation::Ge
            && self.rhs == 0.0
            && self.lhs.terms.len() == 1
            && self.lhs.terms[0].coefficient == 1.0
    }
}

impl Problem {
    pub fn objective_name(&self) -> &str {
        self.objective_name.as_deref().unwrap_or("z")
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Le => write!(f, "<="),
            Relation::Ge => write!(f, ">="),
            Relation::Eq => write!(f, "="),
        }
    }
}

impl std::fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            let magnitude = term.coefficient.abs();
            match (i, term.coefficient < 0.0) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }
            if magnitude != 1.0 {
                write!(f, "{}", magnitude)?;
            }
            write!(f, "{}", term.variable)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for ConstraintDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.relation, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(coefficient: f64, variable: &str) -> Term {
        Term {
            span: Span::new(0, 0),
            coefficient,
            variable: variable.to_string(),
        }
    }

    #[test]
    fn test_display_constraint() {
        let c = ConstraintDef {
            span: Span::new(0, 0),
            line: 1,
            lhs: LinearExpr {
                terms: vec![term(-1.0, "x1"), term(2.5, "x2"), term(-3.0, "x3"), term(1.0, "x4")],
            },
            relation: Relation::Le,
            rhs: -2.0,
        };
        assert_eq!(c.to_string(), "-x1 + 2.5x2 - 3x3 + x4 <= -2");
    }

    #[test]
    fn test_sign_declaration_shape() {
        let mut c = ConstraintDef {
            span: Span::new(0, 0),
            line: 1,
            lhs: LinearExpr { terms: vec![term(1.0, "x")] },
            relation: Relation::Ge,
            rhs: 0.0,
        };
        assert!(c.is_sign_declaration());
        c.lhs.terms[0].coefficient = 2.0;
        assert!(!c.is_sign_declaration());
    }
}
