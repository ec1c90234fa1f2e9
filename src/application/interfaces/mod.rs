mod completion_gateway;
mod session_store;

pub use completion_gateway::*;
pub use session_store::*;
