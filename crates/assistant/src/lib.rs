//! wmforge Assistant
//!
//! A free-text question/answer exchange with a hosted language model about
//! the command being built. The exchange is the only asynchronous part of
//! wmforge and is fully decoupled from compilation:
//!
//! - [`context`] summarizes the current settings in one line
//! - [`provider`] defines the [`Assistant`] trait and its error type
//! - [`gemini`] implements the trait over the Gemini REST API
//! - [`conversation`] keeps the message log and tags stale answers

pub mod context;
pub mod conversation;
pub mod gemini;
pub mod provider;

pub use context::summarize_context;
pub use conversation::*;
pub use gemini::GeminiAssistant;
pub use provider::*;
