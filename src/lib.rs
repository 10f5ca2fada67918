//! chatdesk: chat client core
//!
//! This library provides the core pieces of a chat client for hosted LLM
//! providers: provider adapters that speak the streaming chat-completion
//! protocol, the static model metadata table, persisted user settings, and
//! the default-session seed data the UI layer starts from.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::too_many_lines)]

pub mod cli;
pub mod config;
pub mod error;
pub mod messages;
pub mod services;
pub mod sessions;

// Re-exports for convenience
pub use error::{ChatError, Result};
