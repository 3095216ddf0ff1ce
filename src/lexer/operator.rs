//! Punctuation scanning with longest-match resolution.

use crate::lexer::cursor::Cursor;
use crate::lexer::token::{OperatorKind, TokenKind};

/// Result of matching one punctuation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OperatorScan {
    /// Token kind for the matched punctuation.
    pub(crate) kind: TokenKind,
    /// Exact source lexeme.
    pub(crate) lexeme: &'static str,
}

/// Matches punctuation at the cursor using longest-match rules.
///
/// Multi-character forms win over their single-character prefixes; a lone `-`
/// backtracks to a minus token rather than the start of `---`. The cursor is
/// not advanced.
pub(crate) fn match_operator(cursor: &Cursor) -> Option<OperatorScan> {
    let first = cursor.peek()?;
    let second = cursor.peek_at(1);
    let third = cursor.peek_at(2);

    // Longest-match precedence.
    if first == '-' && second == Some('-') && third == Some('-') {
        return Some(OperatorScan {
            kind: TokenKind::NodeStart,
            lexeme: "---",
        });
    }
    if first == '=' && second == Some('=') && third == Some('=') {
        return Some(OperatorScan {
            kind: TokenKind::NodeEnd,
            lexeme: "===",
        });
    }

    let pair = match (first, second) {
        ('<', Some('<')) => Some((TokenKind::CommandStart, "<<")),
        ('>', Some('>')) => Some((TokenKind::CommandEnd, ">>")),
        ('-', Some('>')) => Some((TokenKind::Arrow, "->")),
        ('=', Some('=')) => Some((TokenKind::Operator(OperatorKind::Eq), "==")),
        ('!', Some('=')) => Some((TokenKind::Operator(OperatorKind::Ne), "!=")),
        ('<', Some('=')) => Some((TokenKind::Operator(OperatorKind::Le), "<=")),
        ('>', Some('=')) => Some((TokenKind::Operator(OperatorKind::Ge), ">=")),
        ('&', Some('&')) => Some((TokenKind::Operator(OperatorKind::And), "&&")),
        ('|', Some('|')) => Some((TokenKind::Operator(OperatorKind::Or), "||")),
        ('+', Some('=')) => Some((TokenKind::Operator(OperatorKind::AddAssign), "+=")),
        ('-', Some('=')) => Some((TokenKind::Operator(OperatorKind::SubAssign), "-=")),
        ('*', Some('=')) => Some((TokenKind::Operator(OperatorKind::MulAssign), "*=")),
        ('/', Some('=')) => Some((TokenKind::Operator(OperatorKind::DivAssign), "/=")),
        ('%', Some('=')) => Some((TokenKind::Operator(OperatorKind::ModAssign), "%=")),
        _ => None,
    };
    if let Some((kind, lexeme)) = pair {
        return Some(OperatorScan { kind, lexeme });
    }

    let single = match first {
        '=' => Some((TokenKind::Operator(OperatorKind::Assign), "=")),
        '<' => Some((TokenKind::Operator(OperatorKind::Lt), "<")),
        '>' => Some((TokenKind::Operator(OperatorKind::Gt), ">")),
        '+' => Some((TokenKind::Operator(OperatorKind::Plus), "+")),
        '-' => Some((TokenKind::Operator(OperatorKind::Minus), "-")),
        '*' => Some((TokenKind::Operator(OperatorKind::Star), "*")),
        '/' => Some((TokenKind::Operator(OperatorKind::Slash), "/")),
        '%' => Some((TokenKind::Operator(OperatorKind::Percent), "%")),
        '!' => Some((TokenKind::Operator(OperatorKind::Not), "!")),
        '(' => Some((TokenKind::LeftParen, "(")),
        ')' => Some((TokenKind::RightParen, ")")),
        '[' => Some((TokenKind::LeftBracket, "[")),
        ']' => Some((TokenKind::RightBracket, "]")),
        '{' => Some((TokenKind::LeftBrace, "{")),
        '}' => Some((TokenKind::RightBrace, "}")),
        ',' => Some((TokenKind::Comma, ",")),
        '.' => Some((TokenKind::Dot, ".")),
        ':' => Some((TokenKind::Colon, ":")),
        '#' => Some((TokenKind::Hash, "#")),
        _ => None,
    }?;

    Some(OperatorScan {
        kind: single.0,
        lexeme: single.1,
    })
}
