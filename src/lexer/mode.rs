//! Text-scanning modes and their truncation/escape tables.
//!
//! Exactly one mode is active at a time while scanning free text. Each mode
//! owns the set of characters that end a text run and the set of characters
//! that may follow a backslash.

/// Free-text scanning modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextMode {
    /// Dialogue and metadata lines. The first unescaped `:` of the line is
    /// handled separately as a speaker/key separator.
    Default,
    /// Option text after a choice arrow; additionally truncates at `[` so a
    /// bracketed guard can follow the text.
    Option,
}

impl TextMode {
    /// Returns `true` when `ch` ends a text run in this mode.
    ///
    /// Newlines and `//` comments end runs in every mode and are handled by
    /// the scan loop directly.
    pub(crate) fn truncates_at(self, ch: char) -> bool {
        match self {
            Self::Default => matches!(ch, '{' | '#'),
            Self::Option => matches!(ch, '{' | '#' | '['),
        }
    }

    /// Returns `true` when `ch` is a valid escape target after `\`.
    pub(crate) fn escapes(self, ch: char) -> bool {
        match self {
            Self::Default => matches!(ch, '\\' | '{' | '}' | '#' | ':' | '/'),
            Self::Option => matches!(ch, '\\' | '{' | '}' | '#' | ':' | '/' | '[' | ']'),
        }
    }
}

/// Returns the closing quote paired with an opening quote character.
pub(crate) fn closing_quote(open: char) -> Option<char> {
    match open {
        '"' => Some('"'),
        '\u{201C}' => Some('\u{201D}'), // “ ”
        '「' => Some('」'),
        _ => None,
    }
}

/// Decodes one escaped character inside a quoted string.
///
/// Unknown escapes keep the backslash so authored text is never silently
/// dropped.
pub(crate) fn string_escape(ch: char, close: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        't' => Some('\t'),
        '\\' | '{' | '}' => Some(ch),
        _ if ch == close => Some(ch),
        _ => None,
    }
}
