use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Policy category not found: {0}")]
    NotFound(String),

    #[error("Link {link} is already assigned to category {category}")]
    LinkConflict { link: String, category: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
