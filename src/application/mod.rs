//! # Application Layer
//!
//! Port traits and the use cases that drive a conversation turn.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
