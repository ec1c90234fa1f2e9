mod session;
mod transcript;
mod turn;

pub use session::*;
pub use transcript::*;
pub use turn::*;
