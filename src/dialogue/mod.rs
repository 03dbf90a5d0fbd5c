//! Intake dialogue — slot extraction, canned prompts, and the per-turn
//! manager that drives the conversation.

pub mod extract;
pub mod manager;
pub mod prompts;

pub use extract::MessageExtractor;
pub use manager::{ChatReply, DialogueManager};
