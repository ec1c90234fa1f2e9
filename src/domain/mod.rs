//! # Domain Layer
//!
//! Conversation model (turns, transcripts, sessions) and error types.
//! This layer is independent of external frameworks and infrastructure.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
