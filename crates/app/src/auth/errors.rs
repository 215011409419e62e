//! Auth errors.

use thiserror::Error;

use crate::{api::ApiError, storage::StorageError};

#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Rejected(String),

    #[error("auth request failed")]
    Api(#[source] ApiError),
}

impl From<ApiError> for AuthServiceError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized(_) => Self::InvalidCredentials,
            ApiError::Invalid(message) => Self::Rejected(message),
            other => Self::Api(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthSessionError {
    #[error(transparent)]
    Service(#[from] AuthServiceError),

    #[error("failed to persist auth session")]
    Storage(#[from] StorageError),

    #[error("stored user is corrupt")]
    CorruptUser(#[source] serde_json::Error),
}
