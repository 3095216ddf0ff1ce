//! Bounded resynchronization scans for delimiter recovery.
//!
//! Expressed as pure functions over the token slice so recovery decisions are
//! testable in isolation and never mutate parse state mid-scan.

use crate::lexer::{Token, TokenKind};

/// Maximum number of tokens a recovery scan may look ahead.
pub(crate) const MAX_SYNC_DISTANCE: usize = 50;

/// Outcome of a delimiter synchronization scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyncOutcome {
    /// The missing delimiter itself was found at this index.
    Delimiter(usize),
    /// A safe synchronization token was found at this index; the delimiter
    /// can be treated as inserted before it.
    Boundary(usize),
    /// Neither was found within the scan bound.
    NotFound,
}

/// Scans forward from `from` for `target` or a safe synchronization point.
///
/// Synchronization points are newlines, command closes, and node boundaries;
/// closing delimiters never span lines, so reaching one means the delimiter
/// is missing but the statement structure is intact.
pub(crate) fn scan_for_delimiter(tokens: &[Token], from: usize, target: TokenKind) -> SyncOutcome {
    let limit = from.saturating_add(MAX_SYNC_DISTANCE).min(tokens.len());
    for index in from..limit {
        let kind = tokens[index].kind;
        if kind == target {
            return SyncOutcome::Delimiter(index);
        }
        if is_sync_boundary(kind) {
            return SyncOutcome::Boundary(index);
        }
    }
    SyncOutcome::NotFound
}

/// Scans forward from `from` for the start of the next node.
///
/// Used after a node-level abort: the parser resumes either at a `---` that
/// opens a new node or at the token after a `===` line.
pub(crate) fn scan_for_node_boundary(tokens: &[Token], from: usize) -> usize {
    let mut index = from;
    while index < tokens.len() {
        match tokens[index].kind {
            TokenKind::Eof | TokenKind::NodeStart => return index,
            TokenKind::NodeEnd => {
                index += 1;
                // Swallow the line terminator of the `===` line.
                while index < tokens.len() && tokens[index].kind == TokenKind::Newline {
                    index += 1;
                }
                return index;
            }
            _ => index += 1,
        }
    }
    tokens.len().saturating_sub(1)
}

fn is_sync_boundary(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Comma
            | TokenKind::CommandEnd
            | TokenKind::Newline
            | TokenKind::NodeStart
            | TokenKind::NodeEnd
            | TokenKind::Eof
    )
}
