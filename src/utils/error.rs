use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortingError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Credential error: {0}")]
    CredentialError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid phone number: {input}")]
    InvalidNumber { input: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },

    #[error("Port submission failed: {message}")]
    SubmissionError { message: String },
}

pub type Result<T> = std::result::Result<T, PortingError>;

/// A recoverable upstream lookup failure. Distinct from a registry miss:
/// the classifier downgrades these to "not found" so the batch keeps going,
/// but they are surfaced to the operator as diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct LookupFailure(pub String);

impl LookupFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}
