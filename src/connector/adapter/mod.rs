mod credentials;
mod gemini_client;
mod in_memory_session_store;
mod mock_gateway;

pub use credentials::*;
pub use gemini_client::*;
pub use in_memory_session_store::*;
pub use mock_gateway::*;
