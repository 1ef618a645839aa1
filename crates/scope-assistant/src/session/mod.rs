//! Conversation sessions: history, the per-turn tool-call loop, and the
//! concurrency-safe session store.

mod chat;
mod manager;
mod types;

pub use manager::{Session, SessionStore};
pub use types::{ChatOutcome, Turn, TurnResult, TurnRole};
