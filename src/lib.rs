// ABOUTME: Library root exposing the interpreter components and the program driver

pub mod ast;
pub mod env;
pub mod error;
pub mod eval;
pub mod layout;
pub mod parser;
pub mod render;
pub mod solver;
pub mod value;

use thiserror::Error;

/// What the driver reports: the program failed to parse, or to evaluate
#[derive(Error, Debug)]
pub enum RunError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Eval(#[from] error::EvalError),
}

/// Parses and evaluates a whole program, returning the final runtime
/// (environment plus solver) for inspection.
pub fn run_program(source: &str) -> Result<eval::Runtime, RunError> {
    let program = parser::parse(source).map_err(RunError::Parse)?;
    let mut rt = eval::Runtime::new();
    eval::eval(&program, &mut rt)?;
    Ok(rt)
}
