use thiserror::Error;

/// Top-level error type for minichat.
///
/// Subsystem crates define their own error types and convert into or wrap
/// `MinichatError` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MinichatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MinichatError {
    fn from(err: toml::de::Error) -> Self {
        MinichatError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MinichatError {
    fn from(err: toml::ser::Error) -> Self {
        MinichatError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MinichatError {
    fn from(err: serde_json::Error) -> Self {
        MinichatError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for minichat operations.
pub type Result<T> = std::result::Result<T, MinichatError>;
