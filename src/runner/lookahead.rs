//! Non-mutating classification of the next reachable content.

use std::collections::HashMap;

use tracing::debug;

use crate::evaluator::Evaluator;
use crate::parser::{CommandKind, Condition, Content, ContentId, Script};
use crate::runner::frame::{Frame, FrameOwner};

/// Classification of the next displayable or executable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextContent {
    /// Traversal would complete the dialogue.
    None,
    /// A dialogue line would display.
    Dialogue,
    /// A choice set would collect.
    Choices,
    /// A jump command would run.
    Jump,
    /// Some other command would run.
    Command,
}

/// Walks a copy of the execution stack and classifies the next element.
///
/// Branch decisions come from `memo` where traversal has already made them;
/// guards of conditions traversal has not reached yet are evaluated here, but
/// no memo entry is ever created, so this adds at most one extra evaluation
/// per unreached condition.
pub(crate) fn classify_next<E: Evaluator>(
    script: &Script,
    stack: &[Frame],
    memo: &HashMap<ContentId, usize>,
    evaluator: &mut E,
) -> NextContent {
    let mut frames: Vec<Frame> = stack.to_vec();
    loop {
        let Some(frame) = frames.last().copied() else {
            return NextContent::None;
        };
        let children = frame.owner.children(script);
        if frame.cursor >= children.len() {
            frames.pop();
            continue;
        }
        let id = children[frame.cursor];
        if let Some(top) = frames.last_mut() {
            top.cursor += 1;
        }

        match script.content(id) {
            Some(Content::Dialogue(_)) => return NextContent::Dialogue,
            Some(Content::Choice(_)) => return NextContent::Choices,
            Some(Content::Command(command)) => {
                return match command.kind {
                    CommandKind::Jump { .. } => NextContent::Jump,
                    _ => NextContent::Command,
                };
            }
            Some(Content::Condition(condition)) => {
                let chosen = match memo.get(&id) {
                    Some(&branch) => Some(branch),
                    None => peek_branch(condition, evaluator),
                };
                if let Some(branch) = chosen {
                    let has_children = condition
                        .branches
                        .get(branch)
                        .is_some_and(|b| !b.children.is_empty());
                    if has_children {
                        frames.push(Frame::new(FrameOwner::ConditionBranch {
                            condition: id,
                            branch,
                        }));
                    }
                }
            }
            None => return NextContent::None,
        }
    }
}

/// Guard evaluation for lookahead only: failures downgrade to `false` with a
/// debug log instead of the traversal-path error.
fn peek_branch<E: Evaluator>(condition: &Condition, evaluator: &mut E) -> Option<usize> {
    for (index, branch) in condition.branches.iter().enumerate() {
        let Some(guard) = &branch.guard else {
            return Some(index);
        };
        match evaluator.evaluate(guard) {
            Ok(value) if value.as_bool() == Some(true) => return Some(index),
            Ok(_) => {}
            Err(error) => {
                debug!(position = %guard.position, %error, "lookahead guard evaluation failed");
            }
        }
    }
    None
}
