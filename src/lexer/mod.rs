//! Modal, indentation-sensitive lexer for dialogue scripts.
//!
//! [`tokenize`] converts raw script text into a flat token sequence. The
//! lexer is total: malformed input is repaired in place, reported through
//! [`LexDiagnostic`] values, and never aborts the scan. The output always
//! ends with exactly one [`TokenKind::Eof`], and `Indent`/`Dedent` tokens are
//! balanced for every input.

mod cursor;
mod diagnostics;
mod mode;
mod operator;
mod position;
mod token;

pub use diagnostics::{LexDiagnostic, LexDiagnosticCode, Severity};
pub use position::Position;
pub use token::{Keyword, OperatorKind, Token, TokenKind};

use tracing::warn;

use crate::lexer::cursor::Cursor;
use crate::lexer::mode::{closing_quote, string_escape, TextMode};
use crate::lexer::operator::match_operator;

/// Indentation width contributed by one tab character.
const TAB_WIDTH: u32 = 4;

/// Interpolations nested deeper than this are abandoned with a diagnostic.
const MAX_INTERPOLATION_DEPTH: u32 = 32;

/// Tokens plus the diagnostics accumulated while producing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexOutput {
    /// Token sequence, terminated by one `Eof`.
    pub tokens: Vec<Token>,
    /// Recovery diagnostics in source order.
    pub diagnostics: Vec<LexDiagnostic>,
}

/// Tokenizes one script source into tokens and diagnostics.
pub fn tokenize(source: &str) -> LexOutput {
    Lexer::new(source).run()
}

/// Modal scanner over one script source.
#[derive(Debug)]
pub struct Lexer {
    cursor: Cursor,
    tokens: Vec<Token>,
    diagnostics: Vec<LexDiagnostic>,
    indent_stack: Vec<u32>,
    interpolation_depth: u32,
}

impl Lexer {
    /// Creates a lexer over `source`.
    pub fn new(source: &str) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            indent_stack: vec![0],
            interpolation_depth: 0,
        }
    }

    /// Runs the scan to completion.
    pub fn run(mut self) -> LexOutput {
        while !self.cursor.is_eof() {
            self.scan_line();
        }

        let end = self.cursor.position();
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.tokens.push(Token::new(TokenKind::Dedent, "", end));
        }
        self.tokens.push(Token::new(TokenKind::Eof, "", end));

        LexOutput {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    // -- Line structure --

    fn scan_line(&mut self) {
        let width = self.scan_indentation();

        // Blank and comment-only lines produce no tokens at all; the trailing
        // Newline of the previous content line already separates statements,
        // so runs of such lines collapse to a single Newline.
        if self.at_line_end() {
            self.consume_line_end();
            return;
        }
        if self.at_comment() {
            self.skip_to_line_end();
            self.consume_line_end();
            return;
        }

        self.apply_indentation(width);
        self.scan_statement();
        self.finish_line();
    }

    fn scan_indentation(&mut self) -> u32 {
        let mut width = 0;
        while let Some(ch) = self.cursor.peek() {
            match ch {
                ' ' => width += 1,
                '\t' => width += TAB_WIDTH,
                '\r' => {}
                _ => break,
            }
            self.cursor.advance();
        }
        width
    }

    fn apply_indentation(&mut self, width: u32) {
        let current = self.indent_stack.last().copied().unwrap_or(0);
        if width > current {
            self.indent_stack.push(width);
            let position = self.cursor.position();
            self.tokens.push(Token::new(TokenKind::Indent, "", position));
            return;
        }
        if width == current {
            return;
        }

        while self.indent_stack.len() > 1 {
            let top = self.indent_stack.last().copied().unwrap_or(0);
            if top <= width {
                break;
            }
            self.indent_stack.pop();
            let position = self.cursor.position();
            self.tokens.push(Token::new(TokenKind::Dedent, "", position));
        }

        let floor = self.indent_stack.last().copied().unwrap_or(0);
        if floor != width {
            // No open level matches this width; adopt it as the new floor
            // without emitting tokens so Indent/Dedent stay balanced.
            let position = self.cursor.position();
            self.report(LexDiagnostic::warning(
                LexDiagnosticCode::UnmatchedIndentWidth,
                format!("indentation width {width} matches no open level; treating it as the current level"),
                position,
            ));
            if let Some(top) = self.indent_stack.last_mut() {
                *top = width;
            }
        }
    }

    fn scan_statement(&mut self) {
        let position = self.cursor.position();
        match (self.cursor.peek(), self.cursor.peek_at(1), self.cursor.peek_at(2)) {
            (Some('-'), Some('-'), Some('-')) => {
                self.advance_by(3);
                self.tokens.push(Token::new(TokenKind::NodeStart, "---", position));
                self.skip_spaces();
                if !self.at_line_end() && !self.at_comment() {
                    self.scan_text_line(TextMode::Default, false);
                }
            }
            (Some('='), Some('='), Some('=')) => {
                self.advance_by(3);
                self.tokens.push(Token::new(TokenKind::NodeEnd, "===", position));
                self.skip_spaces();
                if !self.at_line_end() && !self.at_comment() {
                    self.scan_text_line(TextMode::Default, false);
                }
            }
            (Some('-'), Some('>'), _) => {
                self.advance_by(2);
                self.tokens.push(Token::new(TokenKind::Arrow, "->", position));
                self.skip_spaces();
                self.scan_text_line(TextMode::Option, false);
            }
            (Some('<'), Some('<'), _) => {
                self.advance_by(2);
                self.tokens.push(Token::new(TokenKind::CommandStart, "<<", position));
                self.scan_command_tail();
            }
            _ => self.scan_text_line(TextMode::Default, true),
        }
    }

    fn finish_line(&mut self) {
        let position = self.cursor.position();
        self.tokens.push(Token::new(TokenKind::Newline, "", position));
        self.consume_line_end();
    }

    // -- Text modes --

    /// Scans free text to end of line in `mode`.
    ///
    /// `allow_colon` enables speaker/metadata-key truncation at the first
    /// unescaped `:`; it is cleared after the first run so later colons stay
    /// part of the text.
    fn scan_text_line(&mut self, mode: TextMode, mut allow_colon: bool) {
        loop {
            let start = self.cursor.position();
            let mut text = String::new();

            while let Some(ch) = self.cursor.peek() {
                if ch == '\n' || ch == '\r' {
                    break;
                }
                if ch == '\\' {
                    if let Some(next) = self.cursor.peek_at(1) {
                        if mode.escapes(next) {
                            self.advance_by(2);
                            text.push(next);
                            continue;
                        }
                    }
                    self.cursor.advance();
                    text.push('\\');
                    continue;
                }
                if ch == '/' && self.cursor.peek_at(1) == Some('/') {
                    break;
                }
                if mode.truncates_at(ch) || (ch == ':' && allow_colon) {
                    break;
                }
                self.cursor.advance();
                text.push(ch);
            }

            match self.cursor.peek() {
                Some(':') if allow_colon => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        self.tokens.push(Token::new(TokenKind::Text, trimmed, start));
                    }
                    let colon = self.cursor.position();
                    self.cursor.advance();
                    self.tokens.push(Token::new(TokenKind::Colon, ":", colon));
                    self.skip_spaces();
                    allow_colon = false;
                }
                Some('{') => {
                    if !text.is_empty() {
                        self.tokens.push(Token::new(TokenKind::Text, text, start));
                    }
                    let brace = self.cursor.position();
                    self.cursor.advance();
                    self.tokens.push(Token::new(TokenKind::LeftBrace, "{", brace));
                    self.scan_interpolation();
                    allow_colon = false;
                }
                Some('[') => {
                    // Only reachable in option mode.
                    if !text.trim_end().is_empty() {
                        self.tokens.push(Token::new(TokenKind::Text, text.trim_end(), start));
                    }
                    let bracket = self.cursor.position();
                    self.cursor.advance();
                    self.tokens.push(Token::new(TokenKind::LeftBracket, "[", bracket));
                    self.scan_guard_tail();
                    allow_colon = false;
                }
                Some('#') => {
                    if !text.trim_end().is_empty() {
                        self.tokens.push(Token::new(TokenKind::Text, text.trim_end(), start));
                    }
                    self.scan_tags();
                    allow_colon = false;
                }
                Some('/') => {
                    if !text.trim_end().is_empty() {
                        self.tokens.push(Token::new(TokenKind::Text, text.trim_end(), start));
                    }
                    self.skip_to_line_end();
                    return;
                }
                _ => {
                    if !text.trim_end().is_empty() {
                        self.tokens.push(Token::new(TokenKind::Text, text.trim_end(), start));
                    }
                    return;
                }
            }
        }
    }

    fn scan_tags(&mut self) {
        while self.cursor.peek() == Some('#') {
            let hash = self.cursor.position();
            self.cursor.advance();
            self.tokens.push(Token::new(TokenKind::Hash, "#", hash));

            let start = self.cursor.position();
            let mut word = String::new();
            while let Some(ch) = self.cursor.peek() {
                if ch.is_whitespace() || ch == '#' || ch == '{' {
                    break;
                }
                if ch == '/' && self.cursor.peek_at(1) == Some('/') {
                    break;
                }
                self.cursor.advance();
                word.push(ch);
            }
            if word.is_empty() {
                self.report(LexDiagnostic::warning(
                    LexDiagnosticCode::UnexpectedCharacter,
                    "`#` with no tag name",
                    hash,
                ));
            } else {
                self.tokens.push(Token::new(TokenKind::Text, word, start));
            }
            self.skip_spaces();
        }
    }

    // -- Expression contexts --

    /// Scans expression tokens after `<<` until `>>` or end of line.
    ///
    /// A missing `>>` is left to the parser's delimiter recovery.
    fn scan_command_tail(&mut self) {
        loop {
            self.skip_spaces();
            if self.at_line_end() {
                return;
            }
            if let Some(scan) = match_operator(&self.cursor) {
                if scan.kind == TokenKind::CommandEnd {
                    let position = self.cursor.position();
                    self.advance_by(2);
                    self.tokens.push(Token::new(TokenKind::CommandEnd, ">>", position));
                    return;
                }
            }
            self.scan_expression_token();
        }
    }

    /// Scans expression tokens after `[` until `]` or end of line.
    fn scan_guard_tail(&mut self) {
        loop {
            self.skip_spaces();
            if self.at_line_end() {
                return;
            }
            if self.cursor.peek() == Some(']') {
                let position = self.cursor.position();
                self.cursor.advance();
                self.tokens.push(Token::new(TokenKind::RightBracket, "]", position));
                return;
            }
            self.scan_expression_token();
        }
    }

    /// Scans expression tokens after `{` until the first unbalanced `}`.
    fn scan_interpolation(&mut self) {
        if self.interpolation_depth >= MAX_INTERPOLATION_DEPTH {
            let position = self.cursor.position();
            self.report(LexDiagnostic::error(
                LexDiagnosticCode::InterpolationDepthExceeded,
                format!("interpolations nested deeper than {MAX_INTERPOLATION_DEPTH} levels"),
                position,
            ));
            return;
        }
        self.interpolation_depth += 1;

        let mut depth = 0u32;
        loop {
            self.skip_spaces();
            let position = self.cursor.position();
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    self.report(LexDiagnostic::warning(
                        LexDiagnosticCode::UnterminatedInterpolation,
                        "interpolation reached end of line before `}`",
                        position,
                    ));
                    break;
                }
                Some('}') => {
                    self.cursor.advance();
                    self.tokens.push(Token::new(TokenKind::RightBrace, "}", position));
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                Some('{') => {
                    self.cursor.advance();
                    self.tokens.push(Token::new(TokenKind::LeftBrace, "{", position));
                    depth += 1;
                }
                Some(_) => self.scan_expression_token(),
            }
        }

        self.interpolation_depth -= 1;
    }

    /// Scans exactly one token in expression context.
    ///
    /// Unknown characters are reported and skipped so the scan always makes
    /// progress.
    fn scan_expression_token(&mut self) {
        let position = self.cursor.position();
        let Some(ch) = self.cursor.peek() else {
            return;
        };

        if ch == '$' || ch == '￥' {
            self.cursor.advance();
            let mut lexeme = String::new();
            lexeme.push(ch);
            while let Some(next) = self.cursor.peek() {
                if next.is_alphanumeric() || next == '_' {
                    self.cursor.advance();
                    lexeme.push(next);
                } else {
                    break;
                }
            }
            if lexeme.chars().count() == 1 {
                self.report(LexDiagnostic::warning(
                    LexDiagnosticCode::UnexpectedCharacter,
                    format!("`{ch}` with no variable name"),
                    position,
                ));
                return;
            }
            self.tokens.push(Token::new(TokenKind::Variable, lexeme, position));
            return;
        }

        if ch.is_ascii_digit() {
            let mut lexeme = String::new();
            while let Some(next) = self.cursor.peek() {
                if next.is_ascii_digit() {
                    self.cursor.advance();
                    lexeme.push(next);
                } else {
                    break;
                }
            }
            // At most one decimal point; a second `.` lexes as member access.
            if self.cursor.peek() == Some('.')
                && self.cursor.peek_at(1).is_some_and(|d| d.is_ascii_digit())
            {
                self.cursor.advance();
                lexeme.push('.');
                while let Some(next) = self.cursor.peek() {
                    if next.is_ascii_digit() {
                        self.cursor.advance();
                        lexeme.push(next);
                    } else {
                        break;
                    }
                }
            }
            self.tokens.push(Token::new(TokenKind::Number, lexeme, position));
            return;
        }

        if ch.is_alphabetic() || ch == '_' {
            let mut lexeme = String::new();
            while let Some(next) = self.cursor.peek() {
                if next.is_alphanumeric() || next == '_' {
                    self.cursor.advance();
                    lexeme.push(next);
                } else {
                    break;
                }
            }
            let kind = match Keyword::from_identifier(&lexeme) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Identifier,
            };
            self.tokens.push(Token::new(kind, lexeme, position));
            return;
        }

        if let Some(close) = closing_quote(ch) {
            self.cursor.advance();
            self.scan_string(close);
            return;
        }

        if let Some(scan) = match_operator(&self.cursor) {
            self.advance_by(scan.lexeme.chars().count());
            self.tokens.push(Token::new(scan.kind, scan.lexeme, position));
            return;
        }

        self.report(LexDiagnostic::warning(
            LexDiagnosticCode::UnexpectedCharacter,
            format!("unexpected character `{ch}`"),
            position,
        ));
        self.cursor.advance();
    }

    /// Scans quoted-string content up to `close`.
    ///
    /// Interpolations split the string: a `String` token is flushed before
    /// every `{` and after the closing quote, even when empty, so the parser
    /// sees a well-delimited `String ("{" expr "}" String)*` sequence.
    fn scan_string(&mut self, close: char) {
        let mut start = self.cursor.position();
        let mut text = String::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    let position = self.cursor.position();
                    self.report(LexDiagnostic::warning(
                        LexDiagnosticCode::UnterminatedString,
                        format!("string reached end of line before closing `{close}`"),
                        position,
                    ));
                    self.tokens.push(Token::new(TokenKind::String, text, start));
                    return;
                }
                Some(ch) if ch == close => {
                    self.cursor.advance();
                    self.tokens.push(Token::new(TokenKind::String, text, start));
                    return;
                }
                Some('{') => {
                    self.tokens.push(Token::new(TokenKind::String, text, start));
                    text = String::new();
                    let brace = self.cursor.position();
                    self.cursor.advance();
                    self.tokens.push(Token::new(TokenKind::LeftBrace, "{", brace));
                    self.scan_interpolation();
                    start = self.cursor.position();
                }
                Some('\\') => {
                    if let Some(next) = self.cursor.peek_at(1) {
                        if let Some(decoded) = string_escape(next, close) {
                            self.advance_by(2);
                            text.push(decoded);
                            continue;
                        }
                    }
                    self.cursor.advance();
                    text.push('\\');
                }
                Some(ch) => {
                    self.cursor.advance();
                    text.push(ch);
                }
            }
        }
    }

    // -- Internal helpers --

    fn at_line_end(&self) -> bool {
        matches!(self.cursor.peek(), None | Some('\n') | Some('\r'))
    }

    fn at_comment(&self) -> bool {
        self.cursor.peek() == Some('/') && self.cursor.peek_at(1) == Some('/')
    }

    fn skip_spaces(&mut self) {
        while matches!(self.cursor.peek(), Some(' ') | Some('\t')) {
            self.cursor.advance();
        }
    }

    fn skip_to_line_end(&mut self) {
        while !self.at_line_end() {
            self.cursor.advance();
        }
    }

    fn consume_line_end(&mut self) {
        if self.cursor.peek() == Some('\r') {
            self.cursor.advance();
        }
        if self.cursor.peek() == Some('\n') {
            self.cursor.advance();
        }
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.cursor.advance();
        }
    }

    fn report(&mut self, diagnostic: LexDiagnostic) {
        warn!(
            code = ?diagnostic.code,
            position = %diagnostic.position,
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }
}
