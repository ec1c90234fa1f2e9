//! Browser chat surface: one scrollable conversation plus a text input,
//! served over HTTP with one session per browser cookie.

pub mod page;
pub mod server;
pub mod sessions;

pub use page::{render_page, PageConfig};
pub use server::{app, serve, spawn_sweeper, AppState, ServeOptions, SESSION_COOKIE};
pub use sessions::{SessionRegistry, TurnGuard, WebSession};
