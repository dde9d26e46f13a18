use easylp_solver::Sense;
use thiserror::Error;

use crate::ast::*;
use crate::lexer::{Lexer, Span, Token, TokenKind};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },
    #[error("Line {line}: invalid number {text}")]
    InvalidNumber { text: String, line: usize },
    #[error("Line {line}: a problem must start with Maximize or Minimize")]
    MissingObjective { line: usize },
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Parser over the tokens of a single problem block
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses every problem in `source`, failing on the first error
    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let problems = Self::parse_each(source)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Program { problems })
    }

    /// Parses every problem in `source` independently, so one malformed
    /// problem does not hide the rest
    pub fn parse_each(source: &str) -> Vec<Result<Problem, ParseError>> {
        split_blocks(Lexer::tokenize(source))
            .into_iter()
            .map(|block| Parser::new(block).parse_problem())
            .collect()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn line(&self) -> usize {
        self.current()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current().map(describe).unwrap_or_else(|| "end of input".to_string()),
            line: self.line(),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn last_end(&self, fallback: usize) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span.end)
            .unwrap_or(fallback)
    }

    pub fn parse_problem(&mut self) -> Result<Problem, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));
        let line = self.line();

        let sense = match self.peek_kind() {
            TokenKind::Maximize => Sense::Maximize,
            TokenKind::Minimize => Sense::Minimize,
            _ => return Err(ParseError::MissingObjective { line }),
        };
        self.advance();

        if self.peek_kind() == TokenKind::Colon {
            self.advance();
        }

        // Optional `z =`
        let mut objective_name = None;
        if self.peek_kind() == TokenKind::Ident && self.peek_kind_at(1) == TokenKind::Eq {
            objective_name = self.advance().map(|t| t.text.clone());
            self.advance();
        }

        let objective = self.parse_expr()?;
        self.expect_line_end()?;

        let mut constraints = Vec::new();
        let mut sign_declarations = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Ident if self.peek_kind_at(1) == TokenKind::Comma => {
                    sign_declarations.push(self.parse_sign_declaration()?);
                }
                _ => constraints.push(self.parse_constraint()?),
            }
        }

        let end = self.last_end(start.end);

        Ok(Problem {
            span: start.merge(Span::new(start.start, end)),
            line,
            sense,
            objective_name,
            objective,
            constraints,
            sign_declarations,
        })
    }

    fn parse_constraint(&mut self) -> Result<ConstraintDef, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));
        let line = self.line();

        let lhs = self.parse_expr()?;
        let relation = match self.peek_kind() {
            TokenKind::Le => Relation::Le,
            TokenKind::Ge => Relation::Ge,
            TokenKind::Eq => Relation::Eq,
            _ => return Err(self.unexpected("<=, >= or =")),
        };
        self.advance();
        let rhs = self.parse_signed_number()?;
        let end = self.last_end(start.end);
        self.expect_line_end()?;

        Ok(ConstraintDef {
            span: Span::new(start.start, end),
            line,
            lhs,
            relation,
            rhs,
        })
    }

    /// `x1, x2, x3 >= 0`
    fn parse_sign_declaration(&mut self) -> Result<SignDeclaration, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));
        let line = self.line();

        let mut variables = vec![self.expect(TokenKind::Ident, "variable")?.text];
        while self.peek_kind() == TokenKind::Comma {
            self.advance();
            variables.push(self.expect(TokenKind::Ident, "variable")?.text);
        }
        self.expect(TokenKind::Ge, ">= 0")?;
        let bound = self.parse_signed_number()?;
        if bound != 0.0 {
            return Err(ParseError::UnexpectedToken {
                expected: "0 after >= in a sign declaration".to_string(),
                found: bound.to_string(),
                line,
            });
        }
        let end = self.last_end(start.end);
        self.expect_line_end()?;

        Ok(SignDeclaration {
            span: Span::new(start.start, end),
            line,
            variables,
        })
    }

    fn parse_expr(&mut self) -> Result<LinearExpr, ParseError> {
        let mut terms = Vec::new();

        let first_sign = self.parse_sign();
        terms.push(self.parse_term(first_sign)?);

        loop {
            let sign = match self.peek_kind() {
                TokenKind::Plus => 1.0,
                TokenKind::Minus => -1.0,
                _ => break,
            };
            self.advance();
            terms.push(self.parse_term(sign)?);
        }

        Ok(LinearExpr { terms })
    }

    /// Optional leading `+` or `-`
    fn parse_sign(&mut self) -> f64 {
        match self.peek_kind() {
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            _ => 1.0,
        }
    }

    /// `[number] [*] variable`
    fn parse_term(&mut self, sign: f64) -> Result<Term, ParseError> {
        let start = self.current().map(|t| t.span).unwrap_or(Span::new(0, 0));

        let mut coefficient = 1.0;
        if self.peek_kind() == TokenKind::Number {
            coefficient = self.parse_number()?;
            if self.peek_kind() == TokenKind::Star {
                self.advance();
            }
        }

        let variable = self.expect(TokenKind::Ident, "variable")?;

        Ok(Term {
            span: start.merge(variable.span),
            coefficient: sign * coefficient,
            variable: variable.text,
        })
    }

    fn parse_signed_number(&mut self) -> Result<f64, ParseError> {
        let sign = self.parse_sign();
        Ok(sign * self.parse_number()?)
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        let token = self.expect(TokenKind::Number, "number")?;
        token.text.parse().map_err(|_| ParseError::InvalidNumber {
            text: token.text.clone(),
            line: token.line,
        })
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Newline => "end of line".to_string(),
        TokenKind::Eof => "end of input".to_string(),
        _ => format!("'{}'", token.text),
    }
}

/// Groups tokens into problem blocks. Blank lines end a block and an
/// objective line starts a new one; comment-only and `Subject to` lines are
/// dropped. Each block keeps its line breaks and ends with `Eof`.
fn split_blocks(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut blocks = Vec::new();
    let mut block: Vec<Token> = Vec::new();
    let mut line: Vec<Token> = Vec::new();
    let mut line_is_blank = true;

    for token in tokens {
        match token.kind {
            TokenKind::Newline | TokenKind::Eof => {
                let is_eof = token.kind == TokenKind::Eof;
                match line.first().map(|t| t.kind) {
                    None if line_is_blank => finish_block(&mut block, &mut blocks),
                    None | Some(TokenKind::Subject) => {}
                    Some(kind) => {
                        if matches!(kind, TokenKind::Maximize | TokenKind::Minimize) {
                            finish_block(&mut block, &mut blocks);
                        }
                        block.append(&mut line);
                        block.push(token);
                    }
                }
                line.clear();
                line_is_blank = true;
                if is_eof {
                    finish_block(&mut block, &mut blocks);
                }
            }
            TokenKind::Comment => line_is_blank = false,
            _ => {
                line_is_blank = false;
                line.push(token);
            }
        }
    }

    blocks
}

fn finish_block(block: &mut Vec<Token>, blocks: &mut Vec<Vec<Token>>) {
    if let Some(last) = block.last() {
        let eof = Token::new(
            TokenKind::Eof,
            Span::new(last.span.end, last.span.end),
            "",
            last.line,
        );
        block.push(eof);
        blocks.push(std::mem::take(block));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_problem() {
        let source = "Maximize: z = 5x1 + 4x2\nSubject to:\n6x1 + 4x2 <= 24\nx1 + 2x2 <= 6\nx1, x2 >= 0";
        let program = Parser::parse(source).unwrap();
        assert_eq!(program.problems.len(), 1);

        let problem = &program.problems[0];
        assert_eq!(problem.sense, Sense::Maximize);
        assert_eq!(problem.objective_name(), "z");
        assert_eq!(problem.objective.to_string(), "5x1 + 4x2");
        assert_eq!(problem.constraints.len(), 2);
        assert_eq!(problem.constraints[0].to_string(), "6x1 + 4x2 <= 24");
        assert_eq!(problem.constraints[1].line, 4);
        assert_eq!(problem.sign_declarations[0].variables, vec!["x1", "x2"]);
    }

    #[test]
    fn test_objective_forms() {
        let program = Parser::parse("minimize cost = 3a + 2*b\na + b >= -4").unwrap();
        let problem = &program.problems[0];
        assert_eq!(problem.sense, Sense::Minimize);
        assert_eq!(problem.objective_name(), "cost");
        assert_eq!(problem.objective.terms[1].coefficient, 2.0);
        assert_eq!(problem.constraints[0].relation, Relation::Ge);
        assert_eq!(problem.constraints[0].rhs, -4.0);

        let program = Parser::parse("Max x - y\nx <= 3").unwrap();
        assert_eq!(program.problems[0].objective_name, None);
        assert_eq!(program.problems[0].objective.terms[1].coefficient, -1.0);
    }

    #[test]
    fn test_multiple_problems() {
        let source = r#"
# first problem
Maximize: z = x1 + x2
x1 + x2 <= 4

# second problem
Minimize: z = x1
# a comment inside does not split the problem
x1 <= 2
Maximize: w = y
y <= 1
"#;
        let program = Parser::parse(source).unwrap();
        assert_eq!(program.problems.len(), 3);
        assert_eq!(program.problems[1].constraints.len(), 1);
        assert_eq!(program.problems[1].line, 7);
        assert_eq!(program.problems[2].objective_name(), "w");
    }

    #[test]
    fn test_errors_are_isolated_per_problem() {
        let source = "Maximize: z = x\nx <= \n\nMaximize: z = y\ny <= 2\n";
        let results = Parser::parse_each(source);
        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0],
            Err(ParseError::UnexpectedToken { line: 2, .. })
        ));
        assert!(results[1].is_ok());
        assert!(Parser::parse(source).is_err());
    }

    #[test]
    fn test_missing_objective() {
        let results = Parser::parse_each("x + y <= 3\n");
        assert_eq!(results, vec![Err(ParseError::MissingObjective { line: 1 })]);
    }

    #[test]
    fn test_missing_relation() {
        let err = Parser::parse("Maximize: z = x\nx 4").unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, found, line } => {
                assert_eq!(expected, "<=, >= or =");
                assert_eq!(found, "'4'");
                assert_eq!(line, 2);
            }
            other => panic!("Expected unexpected token, got {:?}", other),
        }
    }

    #[test]
    fn test_sign_declaration_must_be_zero() {
        assert!(Parser::parse("Maximize: z = x + y\nx, y >= 1").is_err());
    }

    #[test]
    fn test_empty_source() {
        assert!(Parser::parse_each("\n# only comments\n\n").is_empty());
    }
}
