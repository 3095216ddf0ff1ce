use skein::lexer::{tokenize, LexDiagnosticCode, TokenKind};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .tokens
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

// ---------------------------------------------------------------------------
// Indent / Dedent structure
// ---------------------------------------------------------------------------

#[test]
fn deeper_line_opens_a_level() {
    assert_eq!(
        kinds("parent\n    child\nback\n"),
        vec![
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn returning_to_the_margin_closes_every_level() {
    assert_eq!(
        kinds("a\n  b\n    c\nd\n"),
        vec![
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Dedent,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn end_of_input_closes_open_levels_before_eof() {
    assert_eq!(
        kinds("a\n    b\n"),
        vec![
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn blank_and_comment_lines_keep_the_current_level() {
    assert_eq!(
        kinds("a\n    b\n\n    // note\n    c\n"),
        vec![
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn a_tab_counts_as_four_columns() {
    assert_eq!(
        kinds("a\n\tb\n    c\n"),
        vec![
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Eof,
        ]
    );
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

#[test]
fn unmatched_dedent_width_adopts_the_new_floor() {
    let output = tokenize("a\n    b\n  c\n");
    let tokens: Vec<TokenKind> = output.tokens.iter().map(|token| token.kind).collect();
    assert_eq!(
        tokens,
        vec![
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Text,
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(
        output.diagnostics[0].code,
        LexDiagnosticCode::UnmatchedIndentWidth
    );
}

#[test]
fn recovery_keeps_indents_and_dedents_balanced() {
    let output = tokenize("a\n        b\n   c\n      d\ne\n");
    let indents = output
        .tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Indent)
        .count();
    let dedents = output
        .tokens
        .iter()
        .filter(|token| token.kind == TokenKind::Dedent)
        .count();
    assert_eq!(indents, dedents);
}
