//! Session tracking — per-student dialogue state and its keyed store.

pub mod state;
pub mod store;

pub use state::{DialogueStage, Session};
pub use store::{SessionStore, spawn_expiry_task};
