use thiserror::Error;

use crate::serde_canon::CanonicalError;

/// Pipeline artifact errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Canonical serialization error: {0}")]
    CanonicalError(#[from] CanonicalError),

    #[error("Artifact hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}
