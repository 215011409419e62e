//! Products service errors.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product not found")]
    NotFound,

    #[error("catalog request failed")]
    Api(#[source] ApiError),
}

impl From<ApiError> for ProductsServiceError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound => Self::NotFound,
            other => Self::Api(other),
        }
    }
}
