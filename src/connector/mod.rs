//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Completion gateways (Gemini over HTTP, offline mock)
//! - Session storage (in-memory, one store per conversation)
//! - Credential loading (environment, TOML secrets file)
//! - Delivery surfaces (CLI controllers, browser chat server)

pub mod adapter;
pub mod api;
pub mod web;

pub use adapter::*;
pub use api::*;
