//! Token contracts for the lexer.

use serde::Serialize;

use crate::lexer::position::Position;

/// Closed token categories produced by [`crate::lexer::tokenize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Node start marker `---`.
    NodeStart,
    /// Node end marker `===`.
    NodeEnd,
    /// Command open bracket `<<`.
    CommandStart,
    /// Command close bracket `>>`.
    CommandEnd,
    /// Choice arrow `->`.
    Arrow,
    /// `:` separating a speaker or metadata key from its value.
    Colon,
    /// `#` introducing a tag.
    Hash,
    /// `{` opening an interpolation.
    LeftBrace,
    /// `}` closing an interpolation.
    RightBrace,
    /// `(`.
    LeftParen,
    /// `)`.
    RightParen,
    /// `[`.
    LeftBracket,
    /// `]`.
    RightBracket,
    /// `,`.
    Comma,
    /// `.` member access.
    Dot,
    /// Expression operator.
    Operator(OperatorKind),
    /// Reserved word recognized case-insensitively.
    Keyword(Keyword),
    /// Bare identifier.
    Identifier,
    /// `$`- or `￥`-prefixed variable.
    Variable,
    /// Numeric literal with at most one decimal point.
    Number,
    /// Quoted string content, quotes removed and escapes decoded.
    String,
    /// Free-text run from one of the text modes.
    Text,
    /// Logical line terminator.
    Newline,
    /// Indentation increase.
    Indent,
    /// Indentation decrease.
    Dedent,
    /// End of input; always the final token.
    Eof,
}

/// Expression operator categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OperatorKind {
    /// `=`.
    Assign,
    /// `+=`.
    AddAssign,
    /// `-=`.
    SubAssign,
    /// `*=`.
    MulAssign,
    /// `/=`.
    DivAssign,
    /// `%=`.
    ModAssign,
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
    Plus,
    /// `-`.
    Minus,
    /// `*`.
    Star,
    /// `/`.
    Slash,
    /// `%`.
    Percent,
    /// `&&`.
    And,
    /// `||`.
    Or,
    /// `!`.
    Not,
}

/// Reserved words of the scripting language.
///
/// Recognition is case-insensitive; `Set` matches `set`, `SET`, and `Set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Keyword {
    /// `if`.
    If,
    /// `elseif`.
    ElseIf,
    /// `else`.
    Else,
    /// `endif`.
    EndIf,
    /// `set`.
    Set,
    /// `declare`.
    Declare,
    /// `jump`.
    Jump,
    /// `call`.
    Call,
    /// `wait`.
    Wait,
    /// `to`.
    To,
    /// `true`.
    True,
    /// `false`.
    False,
    /// `and`.
    And,
    /// `or`.
    Or,
    /// `not`.
    Not,
    /// `xor`.
    Xor,
}

impl Keyword {
    /// Parses an identifier into a keyword when it matches the reserved table.
    pub fn from_identifier(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "if" => Some(Self::If),
            "elseif" => Some(Self::ElseIf),
            "else" => Some(Self::Else),
            "endif" => Some(Self::EndIf),
            "set" => Some(Self::Set),
            "declare" => Some(Self::Declare),
            "jump" => Some(Self::Jump),
            "call" => Some(Self::Call),
            "wait" => Some(Self::Wait),
            "to" => Some(Self::To),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            "xor" => Some(Self::Xor),
            _ => None,
        }
    }
}

/// A lexical token with raw text and source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Token category.
    pub kind: TokenKind,
    /// Token text. Preserved as scanned, except `String` tokens which carry
    /// decoded content without the surrounding quotes.
    pub text: String,
    /// Position of the first character of the token.
    pub position: Position,
}

impl Token {
    /// Creates a token value.
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// Returns the variable name without its `$`/`￥` sigil.
    ///
    /// Empty for non-`Variable` tokens.
    pub fn variable_name(&self) -> String {
        if self.kind == TokenKind::Variable {
            self.text.chars().skip(1).collect()
        } else {
            String::new()
        }
    }
}
