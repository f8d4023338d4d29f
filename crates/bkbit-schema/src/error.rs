//! Error types for schema editing and conversion

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid table: {0}")]
    Csv(#[from] csv::Error),

    #[error("ERROR: {0} not found in schema classes, slots, or enums")]
    NotFound(String),

    #[error("{path}: {message}")]
    Sheet { path: String, message: String },

    #[error("Invalid column descriptor '{0}'")]
    InvalidDescriptor(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to download {url}, status code: {status}")]
    Status { url: String, status: u16 },
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SchemaError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn sheet(path: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::Sheet {
            path: path.into(),
            message: message.into(),
        }
    }
}
