//! Diagnostic contracts for lexer recovery events.
//!
//! The lexer never fails: every malformed construct is repaired in place and
//! reported as a diagnostic value so hosts can surface authoring mistakes
//! without losing the rest of the script.

use crate::lexer::position::Position;

/// Stable diagnostic codes defined for lexer recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexDiagnosticCode {
    /// A dedent landed on an indentation width with no matching open level.
    UnmatchedIndentWidth,
    /// A quoted string reached end of line before its closing quote.
    UnterminatedString,
    /// An interpolation reached end of line before its closing `}`.
    UnterminatedInterpolation,
    /// Interpolations nested beyond the supported depth.
    InterpolationDepthExceeded,
    /// A character with no meaning in the current context was skipped.
    UnexpectedCharacter,
}

/// Diagnostic severity levels shared by the lexer and parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The construct was repaired; output is usable as-is.
    Warning,
    /// The construct was dropped or truncated.
    Error,
}

/// User-facing lexer diagnostic payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexDiagnostic {
    /// Machine-readable diagnostic code.
    pub code: LexDiagnosticCode,
    /// Severity of the reported condition.
    pub severity: Severity,
    /// Human-readable message text.
    pub message: String,
    /// Source position associated with this diagnostic.
    pub position: Position,
}

impl LexDiagnostic {
    /// Creates a warning diagnostic.
    pub fn warning(code: LexDiagnosticCode, message: impl Into<String>, position: Position) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            position,
        }
    }

    /// Creates an error diagnostic.
    pub fn error(code: LexDiagnosticCode, message: impl Into<String>, position: Position) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            position,
        }
    }
}
