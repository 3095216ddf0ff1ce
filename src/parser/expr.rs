//! Expression AST and the fixed precedence table.

use serde::Serialize;

use crate::lexer::{Keyword, OperatorKind, Position, TokenKind};

/// One segment of interpolated text.
///
/// Dialogue lines, option text, and quoted strings all decompose into the
/// same alternation of literal runs and `{expr}` interpolations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TextSegment {
    /// Literal text run.
    Text(String),
    /// `{expr}` interpolation.
    Interpolation(Expr),
}

/// An expression with its source position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    /// Expression variant.
    pub kind: ExprKind,
    /// Position of the expression's first token.
    pub position: Position,
}

impl Expr {
    /// Creates an expression value.
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// Closed expression variant set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExprKind {
    /// Numeric literal.
    Number(f64),
    /// Boolean literal.
    Boolean(bool),
    /// Quoted string with embedded interpolations.
    String(Vec<TextSegment>),
    /// Variable reference, name without its sigil.
    Variable(String),
    /// Bare identifier.
    Identifier(String),
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Function call.
    Call {
        /// Callee expression.
        callee: Box<Expr>,
        /// Ordered arguments.
        arguments: Vec<Expr>,
    },
    /// Member access `target.name`.
    Member {
        /// Target expression.
        object: Box<Expr>,
        /// Member name.
        property: String,
    },
    /// Index access `target[expr]`.
    Index {
        /// Target expression.
        object: Box<Expr>,
        /// Index expression.
        index: Box<Expr>,
    },
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    /// Logical negation (`not`, `!`).
    Not,
    /// Arithmetic negation (`-`).
    Negate,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    /// Logical or.
    Or,
    /// Logical and.
    And,
    /// Logical xor.
    Xor,
    /// `==`.
    Eq,
    /// `!=`.
    Ne,
    /// `<`.
    Lt,
    /// `<=`.
    Le,
    /// `>`.
    Gt,
    /// `>=`.
    Ge,
    /// `+`.
    Add,
    /// `-`.
    Sub,
    /// `*`.
    Mul,
    /// `/`.
    Div,
    /// `%`.
    Mod,
}

impl BinaryOp {
    /// Binding strength; higher binds tighter. Equal strengths associate
    /// left.
    pub(crate) fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And | Self::Xor => 2,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge => 3,
            Self::Add | Self::Sub => 4,
            Self::Mul | Self::Div | Self::Mod => 5,
        }
    }

    /// Maps a token kind to its binary operator, covering both the symbolic
    /// and keyword spellings of the logical operators.
    pub(crate) fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Keyword(Keyword::Or) | TokenKind::Operator(OperatorKind::Or) => {
                Some(Self::Or)
            }
            TokenKind::Keyword(Keyword::And) | TokenKind::Operator(OperatorKind::And) => {
                Some(Self::And)
            }
            TokenKind::Keyword(Keyword::Xor) => Some(Self::Xor),
            TokenKind::Operator(OperatorKind::Eq) => Some(Self::Eq),
            TokenKind::Operator(OperatorKind::Ne) => Some(Self::Ne),
            TokenKind::Operator(OperatorKind::Lt) => Some(Self::Lt),
            TokenKind::Operator(OperatorKind::Le) => Some(Self::Le),
            TokenKind::Operator(OperatorKind::Gt) => Some(Self::Gt),
            TokenKind::Operator(OperatorKind::Ge) => Some(Self::Ge),
            TokenKind::Operator(OperatorKind::Plus) => Some(Self::Add),
            TokenKind::Operator(OperatorKind::Minus) => Some(Self::Sub),
            TokenKind::Operator(OperatorKind::Star) => Some(Self::Mul),
            TokenKind::Operator(OperatorKind::Slash) => Some(Self::Div),
            TokenKind::Operator(OperatorKind::Percent) => Some(Self::Mod),
            _ => None,
        }
    }
}
