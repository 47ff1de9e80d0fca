use thiserror::Error;
use tokio::io;

use crate::storage::StorageError;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    IoError(#[from] io::Error),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("API key not found. Set GEMINI_API_KEY or pass --api-key.")]
    MissingApiKey,
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
    #[error("Failed to read file: {0}")]
    FileRead(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    /// Failures that originate from the generation backend rather than local state.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            ServiceError::NetworkError(_)
                | ServiceError::ApiError(_)
                | ServiceError::MissingApiKey
                | ServiceError::MalformedResponse(_)
        )
    }

    /// Follow-up advice printed under the error, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ServiceError::MissingApiKey => None,
            e if e.is_generation_failure() => {
                Some("Check the network connection and GEMINI_API_KEY, then retry.")
            }
            _ => None,
        }
    }
}
