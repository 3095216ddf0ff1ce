//! Resumable execution engine over compiled scripts.

mod error;
mod events;
mod frame;
mod lookahead;
mod machine;

pub use error::RunnerError;
pub use events::{ChoiceOption, DialogueLine, NoopHandler, RunnerHandler};
pub use frame::{Frame, FrameOwner};
pub use lookahead::NextContent;
pub use machine::{DialogueRunner, RunnerState};
