//! Parser diagnostic contracts.

use crate::lexer::{Position, Severity, Token};

/// Stable parser diagnostic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseDiagnosticCode {
    /// A concrete token did not match grammar expectations.
    UnexpectedToken,
    /// A closing `)`, `]`, `}`, or `>>` was repaired or given up on.
    MissingClosingDelimiter,
    /// A node body reached end of input or the next node without `===`.
    MissingNodeEnd,
    /// A node carried no `title` metadatum to name it.
    MissingTitle,
    /// `<<endif>>`, `<<else>>`, or `<<elseif>>` outside a condition block.
    UnmatchedConditionMarker,
    /// A condition block reached the node end without `<<endif>>`.
    UnterminatedCondition,
    /// An expression could not be completed and was dropped.
    MalformedExpression,
}

/// User-facing parser diagnostic payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// Machine-readable diagnostic code.
    pub code: ParseDiagnosticCode,
    /// Severity of the reported condition.
    pub severity: Severity,
    /// Human-readable message text.
    pub message: String,
    /// Source position associated with this diagnostic.
    pub position: Position,
}

impl ParseDiagnostic {
    /// Creates a warning diagnostic.
    pub fn warning(
        code: ParseDiagnosticCode,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            position,
        }
    }

    /// Creates an error diagnostic.
    pub fn error(
        code: ParseDiagnosticCode,
        message: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            position,
        }
    }

    /// Creates an `UnexpectedToken` warning for a concrete token.
    pub fn unexpected_token(token: &Token, expected: &str) -> Self {
        Self::warning(
            ParseDiagnosticCode::UnexpectedToken,
            format!("expected {expected}, found `{}`", describe(token)),
            token.position,
        )
    }
}

fn describe(token: &Token) -> String {
    if token.text.is_empty() {
        format!("{:?}", token.kind)
    } else {
        token.text.clone()
    }
}
