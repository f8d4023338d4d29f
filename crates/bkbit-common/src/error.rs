//! Error types for bkbit

use thiserror::Error;

/// Result type alias for bkbit operations
pub type Result<T> = std::result::Result<T, BkbitError>;

/// Main error type shared by the bkbit crates
#[derive(Error, Debug)]
pub enum BkbitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedDigest(String),

    #[error("Expected a JSON object for {0}")]
    NotAnObject(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
