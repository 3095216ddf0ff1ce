//! Script AST: node definitions and the content arena.
//!
//! Contents live in a flat arena indexed by [`ContentId`] so execution frames
//! can store plain indices and the tree stays free of reference cycles. The
//! arena is owned by its [`Script`] and immutable once parsing completes.

use serde::Serialize;

use crate::lexer::Position;
use crate::parser::expr::{Expr, TextSegment};

/// Typed index of a content entry in a script's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ContentId(usize);

impl ContentId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Typed index of a node definition within a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw node index.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One compiled script unit.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Script {
    /// Node definitions in authored order.
    pub nodes: Vec<NodeDefinition>,
    /// Flat content storage shared by every node.
    pub contents: ContentArena,
}

impl Script {
    /// Returns the node definition for `id`.
    ///
    /// Ids handed out by this script are always valid; a foreign id returns
    /// `None`.
    pub fn node(&self, id: NodeId) -> Option<&NodeDefinition> {
        self.nodes.get(id.0)
    }

    /// Returns the content entry for `id`.
    pub fn content(&self, id: ContentId) -> Option<&Content> {
        self.contents.get(id)
    }

    /// Finds a node definition by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(NodeId::new)
    }
}

/// Flat content storage.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ContentArena {
    entries: Vec<Content>,
}

impl ContentArena {
    /// Stores one content entry and returns its id.
    pub(crate) fn allocate(&mut self, content: Content) -> ContentId {
        let id = ContentId::new(self.entries.len());
        self.entries.push(content);
        id
    }

    /// Returns the entry for `id`.
    pub fn get(&self, id: ContentId) -> Option<&Content> {
        self.entries.get(id.0)
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discards entries allocated past `len`. Used to roll back an aborted
    /// node parse.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }
}

/// A named, independently jumpable unit of script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDefinition {
    /// Node name, taken from the `title` metadatum.
    pub name: String,
    /// Metadata lines in authored order.
    pub metadata: Vec<Metadata>,
    /// Top-level content of the node body.
    pub contents: Vec<ContentId>,
    /// Position of the node's first line.
    pub position: Position,
}

/// One `key: value` metadata line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Metadata key.
    pub key: String,
    /// Metadata value, surrounding whitespace trimmed.
    pub value: String,
    /// Position of the key.
    pub position: Position,
}

/// Closed set of displayable or executable node-body elements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Content {
    /// A spoken or narrated line.
    Dialogue(Dialogue),
    /// A player choice.
    Choice(Choice),
    /// An `if`/`elseif`/`else` block.
    Condition(Condition),
    /// A `<<…>>` command.
    Command(Command),
}

/// A dialogue line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dialogue {
    /// Speaker name; `None` for narration.
    pub speaker: Option<String>,
    /// Text and interpolation segments.
    pub segments: Vec<TextSegment>,
    /// Authored tags followed by the synthesized per-line tag.
    pub tags: Vec<String>,
    /// Content indented under this line.
    pub children: Vec<ContentId>,
    /// Position of the line.
    pub position: Position,
}

/// A player choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    /// Option text segments.
    pub segments: Vec<TextSegment>,
    /// Availability guard from a `[if expr]` suffix.
    pub guard: Option<Expr>,
    /// Authored tags followed by the synthesized per-line tag.
    pub tags: Vec<String>,
    /// Content entered when the choice is selected.
    pub children: Vec<ContentId>,
    /// Position of the arrow.
    pub position: Position,
}

/// A condition block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    /// Branches in authored order. At most one branch has no guard (the
    /// `else` arm) and it is always last.
    pub branches: Vec<ConditionBranch>,
    /// Position of the opening `<<if`.
    pub position: Position,
}

/// One arm of a condition block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionBranch {
    /// Guard expression; `None` for the `else` arm.
    pub guard: Option<Expr>,
    /// Branch body.
    pub children: Vec<ContentId>,
    /// Position of the branch marker.
    pub position: Position,
}

/// A `<<…>>` command line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    /// Command variant.
    pub kind: CommandKind,
    /// Position of the opening `<<`.
    pub position: Position,
}

/// Closed command variant set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CommandKind {
    /// Variable declaration or mutation.
    Var(VarCommand),
    /// Function or host-command invocation.
    Call(CallCommand),
    /// Jump to another node.
    Jump {
        /// Target node name.
        target: String,
    },
    /// Pause for a duration.
    Wait {
        /// Duration expression, in seconds.
        duration: Expr,
    },
}

/// A `<<set>>`/`<<declare>>` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarCommand {
    /// Operation applied to the variable.
    pub op: VarOp,
    /// Variable name without its sigil.
    pub name: String,
    /// Value expression.
    pub value: Expr,
}

/// Variable command operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VarOp {
    /// `<<declare $x = …>>`.
    Declare,
    /// `<<set $x to …>>` or `=`.
    Set,
    /// `+=`.
    Add,
    /// `-=`.
    Sub,
    /// `*=`.
    Mul,
    /// `/=`.
    Div,
    /// `%=`.
    Mod,
}

/// A `<<call f(…)>>` or bare `<<name …>>` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallCommand {
    /// Callee name.
    pub function: String,
    /// Ordered argument expressions.
    pub arguments: Vec<Expr>,
}
