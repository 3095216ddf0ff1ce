//! Resumable dialogue runner.
//!
//! A cooperative state machine over an explicit stack of [`Frame`]s. Each
//! `advance` performs one turn: it displays exactly one dialogue line or one
//! choice set, draining commands and conditions silently on the way. All
//! traversal state lives here; the compiled script is shared read-only, so
//! any number of runners can walk the same script concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::evaluator::Evaluator;
use crate::parser::{CommandKind, Condition, Content, ContentId, Script, TextSegment};
use crate::registry::DialogueRegistry;
use crate::runner::error::RunnerError;
use crate::runner::events::{ChoiceOption, DialogueLine, RunnerHandler};
use crate::runner::frame::{Frame, FrameOwner};
use crate::runner::lookahead::{classify_next, NextContent};

/// Runner lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// No dialogue is running.
    Idle,
    /// A dialogue is running and can be advanced.
    Active,
    /// A choice set is pending; only `select_choice` (or a forced end/jump)
    /// makes progress.
    CollectingChoices,
}

/// Resumable interpreter over compiled scripts.
#[derive(Debug)]
pub struct DialogueRunner<E, H> {
    registry: Arc<DialogueRegistry>,
    evaluator: E,
    handler: H,
    state: RunnerState,
    script: Option<Arc<Script>>,
    stack: Vec<Frame>,
    pending_choices: Vec<ContentId>,
    pending_options: Vec<ChoiceOption>,
    condition_memo: HashMap<ContentId, usize>,
}

impl<E: Evaluator, H: RunnerHandler> DialogueRunner<E, H> {
    /// Creates an idle runner over `registry`.
    pub fn new(registry: Arc<DialogueRegistry>, evaluator: E, handler: H) -> Self {
        Self {
            registry,
            evaluator,
            handler,
            state: RunnerState::Idle,
            script: None,
            stack: Vec::new(),
            pending_choices: Vec::new(),
            pending_options: Vec::new(),
            condition_memo: HashMap::new(),
        }
    }

    // -- Lifecycle --

    /// Starts a dialogue at `node`, resuming its body at `start_index`.
    ///
    /// Rejected while a dialogue is running. An unknown node name is logged
    /// and returned as an error with state unchanged. On success the runner
    /// fires dialogue-started and node-started and performs the first
    /// advance.
    pub fn start_dialogue(&mut self, node: &str, start_index: usize) -> Result<(), RunnerError> {
        if self.state != RunnerState::Idle {
            warn!(node, "start requested while a dialogue is running");
            return Err(RunnerError::AlreadyActive);
        }
        self.begin(node, start_index)
    }

    /// Starts a dialogue unconditionally, abandoning any running session.
    pub fn force_start_dialogue(
        &mut self,
        node: &str,
        start_index: usize,
    ) -> Result<(), RunnerError> {
        if self.state != RunnerState::Idle {
            debug!(node, "forcing start over a running dialogue");
            self.reset();
        }
        self.begin(node, start_index)
    }

    /// Performs one traversal turn.
    pub fn advance(&mut self) -> Result<(), RunnerError> {
        match self.state {
            RunnerState::Idle => {
                warn!("advance requested while idle");
                Err(RunnerError::NotActive)
            }
            RunnerState::CollectingChoices => {
                warn!("advance requested while a choice selection is pending");
                Err(RunnerError::AwaitingSelection)
            }
            RunnerState::Active => self.step(),
        }
    }

    /// Accepts one entry of the pending choice set.
    ///
    /// Out-of-range indices and failed guards are rejected without losing
    /// the pending set, so the host may retry with a different index.
    pub fn select_choice(&mut self, index: usize) -> Result<(), RunnerError> {
        if self.state != RunnerState::CollectingChoices {
            warn!(index, "selection requested with no pending choices");
            return Err(RunnerError::NoPendingChoices);
        }
        let Some(&id) = self.pending_choices.get(index) else {
            warn!(
                index,
                available = self.pending_choices.len(),
                "choice index out of range"
            );
            return Err(RunnerError::ChoiceOutOfRange {
                index,
                available: self.pending_choices.len(),
            });
        };
        let Some(script) = self.script.clone() else {
            self.reset();
            return Err(RunnerError::NotActive);
        };
        let Some(Content::Choice(choice)) = script.content(id) else {
            error!("pending choice no longer resolves; ending dialogue");
            self.finish();
            return Ok(());
        };

        if let Some(guard) = &choice.guard {
            match self.evaluator.evaluate(guard) {
                Ok(value) if value.as_bool() == Some(true) => {}
                Ok(value) => {
                    warn!(index, kind = value.type_name(), "choice guard rejected the selection");
                    return Err(RunnerError::ChoiceUnavailable(index));
                }
                Err(eval_error) => {
                    error!(index, %eval_error, "choice guard evaluation failed");
                    return Err(RunnerError::ChoiceUnavailable(index));
                }
            }
        }

        let option = self.pending_options.get(index).cloned();
        self.pending_choices.clear();
        self.pending_options.clear();
        self.state = RunnerState::Active;
        if let Some(option) = &option {
            self.handler.on_option_selected(option);
        }
        if !choice.children.is_empty() {
            self.stack.push(Frame::new(FrameOwner::Choice(id)));
        }
        self.step()
    }

    /// Clears all traversal state and restarts at `name`.
    ///
    /// Legal from `Active` and `CollectingChoices`; the pending choice set is
    /// discarded.
    pub fn jump_to_node(&mut self, name: &str) -> Result<(), RunnerError> {
        if self.state == RunnerState::Idle {
            warn!(node = name, "jump requested while idle");
            return Err(RunnerError::NotActive);
        }
        if !self.registry.contains(name) {
            warn!(node = name, "jump requested for unknown node");
            return Err(RunnerError::NodeNotFound(name.to_string()));
        }
        self.jump_internal(name);
        self.state = RunnerState::Active;
        self.step()
    }

    /// Ends the running dialogue.
    ///
    /// The unforced form is rejected while idle or while a choice selection
    /// is pending; `force` resets from any state.
    pub fn end_dialogue(&mut self, force: bool) -> Result<(), RunnerError> {
        match self.state {
            RunnerState::Idle if !force => {
                warn!("end requested while idle");
                Err(RunnerError::NotActive)
            }
            RunnerState::CollectingChoices if !force => {
                warn!("end requested while a choice selection is pending");
                Err(RunnerError::AwaitingSelection)
            }
            state => {
                let was_running = state != RunnerState::Idle;
                self.reset();
                if was_running {
                    self.handler.on_dialogue_completed();
                }
                Ok(())
            }
        }
    }

    // -- Inspection --

    /// Classifies the next reachable element without changing traversal
    /// state.
    ///
    /// Takes `&mut self` only because guard evaluation goes through the
    /// evaluator; stack, cursors, and the condition memo are untouched.
    pub fn has_next_content(&mut self) -> NextContent {
        match self.state {
            RunnerState::Idle => NextContent::None,
            RunnerState::CollectingChoices => NextContent::Choices,
            RunnerState::Active => {
                let Some(script) = self.script.clone() else {
                    return NextContent::None;
                };
                classify_next(&script, &self.stack, &self.condition_memo, &mut self.evaluator)
            }
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Returns `true` while a dialogue is running or parked on choices.
    pub fn is_active(&self) -> bool {
        self.state != RunnerState::Idle
    }

    /// Returns the host evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Returns the host evaluator mutably.
    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    /// Returns the host handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Returns the host handler mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    // -- Traversal internals --

    fn begin(&mut self, node: &str, start_index: usize) -> Result<(), RunnerError> {
        let Some(handle) = self.registry.resolve(node) else {
            warn!(node, "start requested for unknown node");
            return Err(RunnerError::NodeNotFound(node.to_string()));
        };
        self.stack.clear();
        self.pending_choices.clear();
        self.pending_options.clear();
        self.condition_memo.clear();
        self.script = Some(Arc::clone(&handle.script));
        self.stack
            .push(Frame::with_cursor(FrameOwner::Node(handle.node), start_index));
        self.state = RunnerState::Active;
        self.handler.on_dialogue_started();
        self.handler.on_node_started(node);
        self.step()
    }

    /// One turn: displays one dialogue line or one choice set, draining
    /// commands and conditions on the way.
    fn step(&mut self) -> Result<(), RunnerError> {
        loop {
            let Some(script) = self.script.clone() else {
                self.finish();
                return Ok(());
            };
            let Some(frame) = self.stack.last().copied() else {
                self.finish();
                return Ok(());
            };
            let children = frame.owner.children(&script);
            if frame.cursor >= children.len() {
                self.pop_frame();
                continue;
            }
            let id = children[frame.cursor];
            let Some(content) = script.content(id) else {
                error!("content id does not resolve; ending dialogue");
                self.finish();
                return Ok(());
            };

            match content {
                Content::Dialogue(dialogue) => {
                    self.advance_cursor();
                    if !dialogue.children.is_empty() {
                        self.stack.push(Frame::new(FrameOwner::Dialogue(id)));
                    }
                    let line = DialogueLine {
                        speaker: dialogue.speaker.clone(),
                        text: self.render_text(&dialogue.segments),
                        tags: dialogue.tags.clone(),
                    };
                    self.handler.on_dialogue_displayed(&line);
                    return Ok(());
                }
                Content::Choice(_) => {
                    // Absorb the whole run of consecutive sibling choices
                    // into one pending set; guards wait until selection.
                    let mut run = Vec::new();
                    let mut cursor = frame.cursor;
                    while cursor < children.len() {
                        if matches!(script.content(children[cursor]), Some(Content::Choice(_))) {
                            run.push(children[cursor]);
                            cursor += 1;
                        } else {
                            break;
                        }
                    }
                    if let Some(top) = self.stack.last_mut() {
                        top.cursor = cursor;
                    }

                    let mut options = Vec::with_capacity(run.len());
                    for (index, &choice_id) in run.iter().enumerate() {
                        if let Some(Content::Choice(choice)) = script.content(choice_id) {
                            options.push(ChoiceOption {
                                index,
                                text: self.render_text(&choice.segments),
                                tags: choice.tags.clone(),
                            });
                        }
                    }
                    self.pending_choices = run;
                    self.pending_options = options;
                    self.state = RunnerState::CollectingChoices;
                    self.handler.on_choices_displayed(&self.pending_options);
                    return Ok(());
                }
                Content::Command(command) => {
                    self.advance_cursor();
                    match &command.kind {
                        CommandKind::Jump { target } => self.jump_internal(target),
                        _ => match self.evaluator.execute_command(command) {
                            Ok(Some(target)) => self.jump_internal(&target),
                            Ok(None) => {}
                            Err(eval_error) => {
                                error!(position = %command.position, %eval_error, "command execution failed; skipping command");
                            }
                        },
                    }
                }
                Content::Condition(condition) => {
                    self.advance_cursor();
                    if let Some(branch) = self.select_branch(condition) {
                        let has_children = condition
                            .branches
                            .get(branch)
                            .is_some_and(|b| !b.children.is_empty());
                        if has_children {
                            // Memoized for the duration of this visit; the
                            // entry is dropped when the branch frame pops.
                            self.condition_memo.insert(id, branch);
                            self.stack.push(Frame::new(FrameOwner::ConditionBranch {
                                condition: id,
                                branch,
                            }));
                        }
                    }
                }
            }
        }
    }

    /// Picks the first branch whose guard holds.
    ///
    /// Non-boolean results and evaluation failures count as false; guard
    /// evaluation never aborts an in-progress traversal.
    fn select_branch(&mut self, condition: &Condition) -> Option<usize> {
        for (index, branch) in condition.branches.iter().enumerate() {
            let Some(guard) = &branch.guard else {
                return Some(index);
            };
            match self.evaluator.evaluate(guard) {
                Ok(value) => match value.as_bool() {
                    Some(true) => return Some(index),
                    Some(false) => {}
                    None => {
                        error!(position = %guard.position, kind = value.type_name(), "non-boolean guard treated as false");
                    }
                },
                Err(eval_error) => {
                    error!(position = %guard.position, %eval_error, "guard evaluation failed; treated as false");
                }
            }
        }
        None
    }

    fn render_text(&mut self, segments: &[TextSegment]) -> String {
        match self.evaluator.build_text(segments) {
            Ok(text) => text,
            Err(eval_error) => {
                error!(%eval_error, "text interpolation failed; falling back to literal segments");
                segments
                    .iter()
                    .filter_map(|segment| match segment {
                        TextSegment::Text(text) => Some(text.as_str()),
                        TextSegment::Interpolation(_) => None,
                    })
                    .collect()
            }
        }
    }

    fn jump_internal(&mut self, name: &str) {
        match self.registry.resolve(name) {
            Some(handle) => {
                self.stack.clear();
                self.pending_choices.clear();
                self.pending_options.clear();
                self.condition_memo.clear();
                self.script = Some(Arc::clone(&handle.script));
                self.stack.push(Frame::new(FrameOwner::Node(handle.node)));
                self.handler.on_node_started(name);
            }
            None => {
                error!(node = %name, "jump target is not registered; skipping jump");
            }
        }
    }

    fn advance_cursor(&mut self) {
        if let Some(top) = self.stack.last_mut() {
            top.cursor += 1;
        }
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.stack.pop() {
            if let FrameOwner::ConditionBranch { condition, .. } = frame.owner {
                self.condition_memo.remove(&condition);
            }
        }
    }

    fn finish(&mut self) {
        self.reset();
        self.handler.on_dialogue_completed();
    }

    fn reset(&mut self) {
        self.state = RunnerState::Idle;
        self.script = None;
        self.stack.clear();
        self.pending_choices.clear();
        self.pending_options.clear();
        self.condition_memo.clear();
    }
}
