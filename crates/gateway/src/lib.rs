//! Persona chat gateway: turn orchestrator, HTTP API, CLI and bootstrap.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
