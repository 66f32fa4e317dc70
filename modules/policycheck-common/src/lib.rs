pub mod config;
pub mod corpus;
pub mod error;

pub use config::Config;
pub use corpus::{is_allowed_link, PolicyCategory, PolicyCorpus};
pub use error::PolicyError;
