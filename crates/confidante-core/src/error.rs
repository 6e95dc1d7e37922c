use thiserror::Error;

/// Top-level error type for the Confidante site services.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for ConfidanteError` so that `?` works across
/// crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfidanteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Content error: {0}")]
    Content(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ConfidanteError {
    fn from(err: toml::de::Error) -> Self {
        ConfidanteError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfidanteError {
    fn from(err: toml::ser::Error) -> Self {
        ConfidanteError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ConfidanteError {
    fn from(err: serde_json::Error) -> Self {
        ConfidanteError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Confidante operations.
pub type Result<T> = std::result::Result<T, ConfidanteError>;
