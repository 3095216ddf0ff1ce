//! Character cursor with line/column tracking.
//!
//! The cursor iterates over `char`s rather than bytes because the surface
//! syntax admits CJK quote pairs and the `￥` variable sigil.

use crate::lexer::position::Position;

/// Character-position cursor over input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cursor {
    chars: Vec<char>,
    index: usize,
    line: u32,
    column: u32,
}

impl Cursor {
    /// Creates a cursor at the start of `source`.
    pub(crate) fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns `true` if the cursor is at or beyond input end.
    pub(crate) fn is_eof(&self) -> bool {
        self.index >= self.chars.len()
    }

    /// Returns the character at cursor position.
    pub(crate) fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    /// Returns the character `offset` positions ahead of the cursor.
    pub(crate) fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    /// Consumes and returns one character, updating line/column bookkeeping.
    pub(crate) fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.index).copied()?;
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Returns the current source position.
    pub(crate) fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}
