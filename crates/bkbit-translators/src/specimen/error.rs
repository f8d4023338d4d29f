//! Errors raised while walking the specimen portal

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpecimenError>;

#[derive(Error, Debug)]
pub enum SpecimenError {
    #[error("Error getting data for NHash ID = {nhash_id}. Status Code: {status}")]
    Status { nhash_id: String, status: u16 },

    #[error("Error getting donor data. Status Code: {0}")]
    DonorStatus(u16),

    #[error("Specimen portal reported an error: {0}")]
    Portal(String),

    #[error("Unsupported category: {0}.")]
    UnsupportedCategory(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Record has no NHash id")]
    MissingRecordId,

    #[error("Invalid value {value} for field {field}")]
    InvalidValue { field: String, value: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed portal response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] bkbit_common::BkbitError),
}
