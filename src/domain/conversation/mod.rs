//! Conversation types: immutable messages and per-turn pipeline state.

mod message;
mod state;

pub use message::{Attachment, Message, MessageRole};
pub use state::TurnState;
