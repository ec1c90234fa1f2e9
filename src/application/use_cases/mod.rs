mod submit_prompt;
mod view_transcript;

pub use submit_prompt::*;
pub use view_transcript::*;
