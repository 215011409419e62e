//! Orders service errors.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("log in to manage orders")]
    Unauthorized,

    #[error("{0}")]
    Rejected(String),

    #[error("order request failed")]
    Api(#[source] ApiError),
}

impl From<ApiError> for OrdersServiceError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound => Self::NotFound,
            ApiError::Unauthorized(_) => Self::Unauthorized,
            ApiError::Invalid(message) => Self::Rejected(message),
            other => Self::Api(other),
        }
    }
}
