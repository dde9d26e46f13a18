//! WASM bindings for easylp
//!
//! JavaScript-friendly entry points for browser playgrounds and editors.

use wasm_bindgen::prelude::*;

use crate::compiler::compile_source;
use crate::lexer::Lexer;
use crate::parser::Parser;
use easylp_solver::{Solution, Solver, TableauSnapshot};

/// Parse source code and return the AST as JSON
#[wasm_bindgen]
pub fn parse(source: &str) -> Result<JsValue, JsValue> {
    let program = Parser::parse(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&program).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Tokenize source code and return tokens as JSON
#[wasm_bindgen]
pub fn tokenize(source: &str) -> Result<JsValue, JsValue> {
    let tokens: Vec<TokenInfo> = Lexer::tokenize(source)
        .into_iter()
        .map(|t| TokenInfo {
            kind: format!("{:?}", t.kind),
            text: t.text,
            start: t.span.start,
            end: t.span.end,
            line: t.line,
        })
        .collect();
    serde_wasm_bindgen::to_value(&tokens).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Token information for JavaScript
#[derive(serde::Serialize)]
struct TokenInfo {
    kind: String,
    text: String,
    start: usize,
    end: usize,
    line: usize,
}

/// Solve every problem in `source`. Problems that fail carry an `error`
/// message instead of a solution.
#[wasm_bindgen]
pub fn solve(source: &str) -> Result<JsValue, JsValue> {
    let solver = Solver::new();
    let results: Vec<ProblemResult> = compile_source(source)
        .into_iter()
        .map(|compiled| {
            let compiled = match compiled {
                Ok(compiled) => compiled,
                Err(e) => return ProblemResult::failed(None, e.to_string()),
            };
            let heading = Some(compiled.heading());
            match solver.solve(&compiled.lp_problem) {
                Ok(report) => ProblemResult {
                    heading,
                    status: Some(report.solution.status.to_string()),
                    solution: Some(report.solution),
                    trace: report.trace,
                    error: None,
                },
                Err(e) => ProblemResult::failed(heading, e.to_string()),
            }
        })
        .collect();
    serde_wasm_bindgen::to_value(&results).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[derive(serde::Serialize)]
struct ProblemResult {
    heading: Option<String>,
    status: Option<String>,
    solution: Option<Solution>,
    trace: Vec<TableauSnapshot>,
    error: Option<String>,
}

impl ProblemResult {
    fn failed(heading: Option<String>, error: String) -> Self {
        Self {
            heading,
            status: None,
            solution: None,
            trace: Vec::new(),
            error: Some(error),
        }
    }
}
