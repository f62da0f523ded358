//! The main library for the `magicpedia` child-friendly encyclopedia.
//!
//! This library provides all the core components for the companion app:
//! the character and settings model, the persistent store, the provider
//! adapters (primary and OpenAI-compatible), the answer router, speech
//! synthesis and playback, and the conversation session.

// Public modules, accessible to the binary and other consumers
pub mod audio;
pub mod config;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod router;
pub mod safety;
pub mod session;
pub mod speech;
pub mod store;
pub mod types;

// Re-export common types
pub use error::{AppError, Result};
pub use types::*;
