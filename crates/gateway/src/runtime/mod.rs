//! Core runtime: the orchestrator that ties the character catalog, session
//! history, model gateway and emotion tagger into one serialized turn.
//!
//! Entry point: [`TurnOrchestrator::submit_turn`].

pub mod session_lock;
pub mod turn;

pub use turn::{TurnOrchestrator, TurnSettings};
