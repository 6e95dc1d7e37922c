//! Error types for the dialogue engine and chat sessions.

use confidante_core::error::ConfidanteError;
use uuid::Uuid;

/// Errors from loading the dialogue graph or managing chat sessions.
///
/// Resolving an option label never fails; unknown labels fall back.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("invalid dialogue asset: {0}")]
    InvalidAsset(String),
    #[error("duplicate dialogue key: {0}")]
    DuplicateKey(String),
    #[error("dialogue node '{0}' has an empty response")]
    EmptyResponse(String),
    #[error("dialogue has no initial options")]
    NoInitialOptions,
    #[error("dialogue has no default options")]
    NoDefaultOptions,
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),
    #[error("session closed: {0}")]
    SessionClosed(Uuid),
    #[error("session {0} has not shown its greeting yet")]
    GreetingPending(Uuid),
    #[error("session limit of {0} reached")]
    SessionLimitReached(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for DialogueError {
    fn from(err: serde_json::Error) -> Self {
        DialogueError::InvalidAsset(err.to_string())
    }
}

impl From<DialogueError> for ConfidanteError {
    fn from(err: DialogueError) -> Self {
        match err {
            DialogueError::Io(e) => ConfidanteError::Io(e),
            DialogueError::SessionNotFound(_)
            | DialogueError::SessionClosed(_)
            | DialogueError::GreetingPending(_)
            | DialogueError::SessionLimitReached(_) => ConfidanteError::Session(err.to_string()),
            other => ConfidanteError::Content(other.to_string()),
        }
    }
}
