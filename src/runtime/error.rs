use thiserror::Error;

use super::value::ValueKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Cannot assign to undeclared variable '{name}'")]
    UndeclaredAssignment { name: String },
    #[error("Condition must be a boolean value, got {got}")]
    NonBooleanCondition { got: String },
    #[error("No method '{method}' for operator '{operator}' on value of kind {kind}")]
    MissingOperatorMethod {
        method: &'static str,
        operator: &'static str,
        kind: ValueKind,
    },
    #[error("Value of kind {kind} is not callable")]
    NotCallable { kind: ValueKind },
    #[error("Invalid arguments passed to {function}: expected ({expected}), got ({got})")]
    InvalidArguments {
        function: String,
        expected: String,
        got: String,
    },
    #[error("Maximum call depth of {limit} exceeded")]
    CallDepthExceeded { limit: usize },
    #[error("Division by zero in '{method}'")]
    DivisionByZero { method: &'static str },
    #[error("Failed to write output: {message}")]
    Output { message: String },
}

impl RuntimeError {
    pub(crate) fn output(error: std::io::Error) -> Self {
        Self::Output {
            message: error.to_string(),
        }
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
