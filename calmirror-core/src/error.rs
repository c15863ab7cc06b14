//! Error types for the calmirror ecosystem.

use thiserror::Error;

/// Errors that can occur in mirror operations.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Calendar data parse error: {0}")]
    Parse(String),

    #[error("Record generation error: {0}")]
    Generate(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;
