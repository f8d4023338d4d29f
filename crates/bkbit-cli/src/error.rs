//! Error types for the bkbit CLI
//!
//! Messages are shown to the user as `Error: <message>`, so each one says
//! what to fix.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Specimen portal commands need a bearer token
    #[error("Missing specimen portal token. Set the 'jwt_token' environment variable (or add it to .env).")]
    MissingToken,

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    #[error(transparent)]
    Specimen(#[from] bkbit_translators::specimen::SpecimenError),

    #[error(transparent)]
    Schema(#[from] bkbit_schema::SchemaError),

    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_actionable() {
        assert!(CliError::MissingToken.to_string().contains("jwt_token"));
        assert_eq!(
            CliError::config("BKBIT_HTTP_TIMEOUT_SECS must be a number").to_string(),
            "Configuration error: BKBIT_HTTP_TIMEOUT_SECS must be a number. Check your environment variables or .env file."
        );
    }
}
