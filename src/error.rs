// ABOUTME: Error types for evaluation failures in the blox interpreter

use crate::value::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("unbound name: {0}")]
    UnboundName(String),

    /// Type mismatch with the offending construct, expected type, and actual type
    #[error("{context}: expected {expected}, got {actual}")]
    TypeError {
        context: String,
        expected: &'static str,
        actual: String,
    },

    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == 1 { "" } else { "s" })]
    ArityError {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("list index {index} out of range for length {len}")]
    IndexError { index: i64, len: usize },

    #[error("{0}")]
    ValueError(String),

    #[error("layout constraint rejected: {0}")]
    LayoutError(String),

    #[error("{context}: {source}")]
    IoError {
        context: String,
        source: std::io::Error,
    },
}

impl EvalError {
    /// Create a type mismatch error, capturing the actual value's type name
    pub fn type_error(context: impl Into<String>, expected: &'static str, actual: &Value) -> Self {
        EvalError::TypeError {
            context: context.into(),
            expected,
            actual: actual.type_name().to_string(),
        }
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        EvalError::ValueError(message.into())
    }

    pub fn io_error(context: impl Into<String>, source: std::io::Error) -> Self {
        EvalError::IoError {
            context: context.into(),
            source,
        }
    }
}
