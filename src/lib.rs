//! Dialogue-scripting language front-end and resumable execution engine.
//!
//! A script is a set of named nodes holding speaker lines, player choices,
//! conditionals, and commands. [`compile`] turns source text into a
//! [`Script`](parser::Script); a [`DialogueRegistry`](registry::DialogueRegistry)
//! maps node names to compiled nodes; a
//! [`DialogueRunner`](runner::DialogueRunner) walks the tree one turn at a
//! time, parking on choice sets until the host selects one.
//!
//! ```
//! use skein::{compile, registry::DialogueRegistry};
//!
//! let output = compile("---\ntitle: start\n---\nAlice: Hello!\n===\n");
//! assert!(output.lex_diagnostics.is_empty());
//! assert!(output.parse_diagnostics.is_empty());
//!
//! let mut registry = DialogueRegistry::new();
//! registry.register_script(output.script).unwrap();
//! assert!(registry.contains("start"));
//! ```
//!
//! Expression and command semantics stay with the host behind the
//! [`Evaluator`](evaluator::Evaluator) trait; the engine itself never does
//! arithmetic and never inspects a value beyond its boolean tag.

pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod runner;

use crate::lexer::LexDiagnostic;
use crate::parser::{ParseDiagnostic, Parser, Script};

/// Compiled script plus every diagnostic both stages produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutput {
    /// Compiled script.
    pub script: Script,
    /// Lexer recovery diagnostics in source order.
    pub lex_diagnostics: Vec<LexDiagnostic>,
    /// Parser recovery diagnostics in source order.
    pub parse_diagnostics: Vec<ParseDiagnostic>,
}

/// Lexes and parses one script source.
///
/// Total over arbitrary input: malformed constructs surface as diagnostics,
/// never as an error or panic.
pub fn compile(source: &str) -> CompileOutput {
    let lexed = lexer::tokenize(source);
    let parsed = Parser::new(lexed.tokens).parse();
    CompileOutput {
        script: parsed.script,
        lex_diagnostics: lexed.diagnostics,
        parse_diagnostics: parsed.diagnostics,
    }
}
