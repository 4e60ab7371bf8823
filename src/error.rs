//! Error types for Kysy.

use thiserror::Error;

/// Library-level error type for Kysy operations.
#[derive(Error, Debug)]
pub enum KysyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Document store schema error: {0}")]
    Schema(String),

    #[error("Completion service unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for Kysy operations.
pub type Result<T> = std::result::Result<T, KysyError>;
