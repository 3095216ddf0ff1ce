//! Execution-stack frames over the content arena.

use crate::parser::{Content, ContentId, NodeId, Script};

/// Owner of one activation frame.
///
/// A closed enum over arena indices: dispatch is an exhaustive `match` and a
/// frame can never point at a content kind the runner does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOwner {
    /// Top-level content of a node body.
    Node(NodeId),
    /// Content nested under a dialogue line.
    Dialogue(ContentId),
    /// Content of a selected choice.
    Choice(ContentId),
    /// Body of one chosen condition branch.
    ConditionBranch {
        /// The condition content entry.
        condition: ContentId,
        /// Index of the chosen branch.
        branch: usize,
    },
}

impl FrameOwner {
    /// Returns the content list this frame iterates over.
    ///
    /// An id that does not resolve to the expected kind yields an empty list,
    /// which drains the frame on the next step.
    pub(crate) fn children<'a>(&self, script: &'a Script) -> &'a [ContentId] {
        match *self {
            Self::Node(id) => script
                .node(id)
                .map(|node| node.contents.as_slice())
                .unwrap_or(&[]),
            Self::Dialogue(id) => match script.content(id) {
                Some(Content::Dialogue(dialogue)) => &dialogue.children,
                _ => &[],
            },
            Self::Choice(id) => match script.content(id) {
                Some(Content::Choice(choice)) => &choice.children,
                _ => &[],
            },
            Self::ConditionBranch { condition, branch } => match script.content(condition) {
                Some(Content::Condition(cond)) => cond
                    .branches
                    .get(branch)
                    .map(|b| b.children.as_slice())
                    .unwrap_or(&[]),
                _ => &[],
            },
        }
    }
}

/// One entry of the execution stack: an owner plus a resume cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Content list being traversed.
    pub owner: FrameOwner,
    /// Index of the next child to visit.
    pub cursor: usize,
}

impl Frame {
    /// Creates a frame at cursor `0`.
    pub(crate) fn new(owner: FrameOwner) -> Self {
        Self { owner, cursor: 0 }
    }

    /// Creates a frame resuming at `cursor`.
    pub(crate) fn with_cursor(owner: FrameOwner, cursor: usize) -> Self {
        Self { owner, cursor }
    }
}
