//! Evaluator seam: the runner's view of expression and command semantics.
//!
//! Arithmetic, function dispatch, and variable storage are host concerns.
//! The runner only ever inspects a [`Value`] through [`Value::as_bool`] when
//! deciding guards; everything else passes through opaque.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::parser::{Command, Expr, TextSegment};

/// Tagged value produced by expression evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit float.
    Number(f64),
    /// Owned string.
    String(String),
}

impl Value {
    /// Returns the boolean payload, or `None` for non-boolean values.
    ///
    /// Guards require a genuine boolean; no coercion from numbers or strings.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns a short name for the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str(""),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// Errors surfaced by an evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A referenced variable has no binding.
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    /// A called function is not registered with the host.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    /// Operand types do not fit the attempted operation.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// Any other host-defined failure.
    #[error("{0}")]
    Message(String),
}

/// Host-provided expression and command semantics.
///
/// The seam is synchronous: the runner is a cooperative, single-threaded
/// state machine whose only suspension point is choice collection, so a
/// blocking trait keeps the engine free of a runtime dependency.
pub trait Evaluator {
    /// Evaluates one expression to a value.
    fn evaluate(&mut self, expr: &Expr) -> Result<Value, EvalError>;

    /// Executes one command.
    ///
    /// A returned node name redirects the running dialogue there, as if the
    /// script had jumped explicitly.
    fn execute_command(&mut self, command: &Command) -> Result<Option<String>, EvalError>;

    /// Renders interpolated segments into display text.
    fn build_text(&mut self, segments: &[TextSegment]) -> Result<String, EvalError>;
}
