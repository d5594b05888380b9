//! Shared types for the persona chat gateway: error taxonomy, configuration,
//! character catalog, chat messages, emotion tagging and trace events.

pub mod character;
pub mod config;
pub mod emotion;
pub mod error;
pub mod message;
pub mod trace;
