//! Parser for dialogue scripts: grammar, AST, and error recovery.

mod ast;
mod error;
mod expr;
#[allow(clippy::module_inception)]
mod parser;
mod recovery;

pub use ast::{
    CallCommand, Choice, Command, CommandKind, Condition, ConditionBranch, Content, ContentArena,
    ContentId, Dialogue, Metadata, NodeDefinition, NodeId, Script, VarCommand, VarOp,
};
pub use error::{ParseDiagnostic, ParseDiagnosticCode};
pub use expr::{BinaryOp, Expr, ExprKind, TextSegment, UnaryOp};
pub use parser::{ParseOutput, Parser};
