//! Runner error contracts.
//!
//! Every rejected call is also logged and leaves runner state unchanged, so
//! hosts that ignore the `Err` observe a plain no-op.

use thiserror::Error;

/// Typed rejection reasons for runner calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    /// A start was requested while a dialogue is already running.
    #[error("a dialogue is already running")]
    AlreadyActive,
    /// An operation that needs a running dialogue found none.
    #[error("no dialogue is running")]
    NotActive,
    /// The requested node is not in the registry.
    #[error("node `{0}` is not registered")]
    NodeNotFound(String),
    /// An advance arrived while the runner is parked on a choice set.
    #[error("a choice selection is pending")]
    AwaitingSelection,
    /// A selection arrived with no pending choice set.
    #[error("no choice selection is pending")]
    NoPendingChoices,
    /// The selected index is outside the pending set.
    #[error("choice index {index} is out of range ({available} available)")]
    ChoiceOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of pending choices.
        available: usize,
    },
    /// The selected choice's guard did not evaluate to `true`.
    #[error("choice {0} is not available")]
    ChoiceUnavailable(usize),
}
