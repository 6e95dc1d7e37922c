use confidante_core::error::ConfidanteError;

/// Errors raised while loading or validating the post catalog.
///
/// Queries over a loaded catalog never fail.
#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error("invalid post catalog: {0}")]
    InvalidAsset(String),
    #[error("duplicate post slug: {0}")]
    DuplicateSlug(String),
    #[error("duplicate post id: {0}")]
    DuplicateId(String),
    #[error("post {0} has an empty slug")]
    EmptySlug(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for BlogError {
    fn from(err: serde_json::Error) -> Self {
        BlogError::InvalidAsset(err.to_string())
    }
}

impl From<BlogError> for ConfidanteError {
    fn from(err: BlogError) -> Self {
        match err {
            BlogError::Io(e) => ConfidanteError::Io(e),
            other => ConfidanteError::Content(other.to_string()),
        }
    }
}
