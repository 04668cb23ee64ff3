pub mod ast;
pub mod builtins;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod token;

use thiserror::Error;

use crate::interpreter::{Interpreter, OutputSink};
use crate::parser::ParseError;
use crate::runtime::RuntimeError;

/// Anything that can stop a program: it either fails to parse or fails while
/// running.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(#[from] ParseError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Parses and runs a whole program, returning the sink with everything the
/// program printed. Nothing runs if the source has a syntax error.
pub fn run_source<S: OutputSink>(source: &str, output: S) -> Result<S, Error> {
    let program = parser::parse(source)?;
    let mut interpreter = Interpreter::new(output);
    interpreter.run(&program)?;
    Ok(interpreter.into_output())
}
