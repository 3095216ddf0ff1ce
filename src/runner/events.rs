//! Host notification seam.

/// One displayable dialogue line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueLine {
    /// Speaker name; `None` for narration.
    pub speaker: Option<String>,
    /// Rendered display text, interpolations resolved.
    pub text: String,
    /// Authored tags followed by the synthesized per-line tag.
    pub tags: Vec<String>,
}

/// One entry of a pending choice set.
///
/// Guards are not evaluated at collection time, so availability is decided at
/// selection, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Position within the pending set; pass this to `select_choice`.
    pub index: usize,
    /// Rendered option text.
    pub text: String,
    /// Authored tags followed by the synthesized per-line tag.
    pub tags: Vec<String>,
}

/// Outbound runner notifications, fired synchronously within the triggering
/// call. Every method defaults to a no-op so hosts implement only what they
/// display.
pub trait RunnerHandler {
    /// A dialogue session started.
    fn on_dialogue_started(&mut self) {}

    /// Traversal entered the named node, at start or after a jump.
    fn on_node_started(&mut self, _node: &str) {}

    /// One dialogue line is ready to display.
    fn on_dialogue_displayed(&mut self, _line: &DialogueLine) {}

    /// A pending choice set is ready; the runner parks until selection.
    fn on_choices_displayed(&mut self, _choices: &[ChoiceOption]) {}

    /// A pending choice was accepted.
    fn on_option_selected(&mut self, _choice: &ChoiceOption) {}

    /// The session ended, by exhaustion or by an unforced end request.
    fn on_dialogue_completed(&mut self) {}
}

/// Handler that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl RunnerHandler for NoopHandler {}
