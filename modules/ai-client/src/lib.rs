pub mod error;
pub mod gemini;
pub mod traits;
pub mod util;

pub use error::AiError;
pub use gemini::Gemini;
pub use traits::{CompletionBackend, CompletionRequest};
pub use util::truncate_to_char_boundary;
