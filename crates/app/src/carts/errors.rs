//! Cart errors.

use thiserror::Error;

use crate::{api::ApiError, storage::StorageError};

/// A quantity below one reached a cart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("quantity must be at least 1")]
pub struct InvalidQuantity;

/// Errors raised by a [`CartStore`](crate::carts::CartStore).
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The cart, or the addressed line, does not exist.
    #[error("cart not found")]
    NotFound,

    /// The store rejected the request payload.
    #[error("{0}")]
    Invalid(String),

    /// Network or server failure.
    #[error("cart request failed: {0}")]
    Transport(#[source] ApiError),
}

impl From<ApiError> for CartStoreError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound => Self::NotFound,
            ApiError::Invalid(message) => Self::Invalid(message),
            other => Self::Transport(other),
        }
    }
}

/// Errors surfaced by [`CartSession`](crate::carts::CartSession) operations.
///
/// The display form of each variant is what ends up in `last_error`.
#[derive(Debug, Error)]
pub enum CartSessionError {
    /// The cart vanished again right after a replacement was created.
    #[error("cart session was lost and could not be recovered")]
    SessionLost,

    #[error(transparent)]
    Store(#[from] CartStoreError),

    #[error("failed to persist cart session: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    InvalidQuantity(#[from] InvalidQuantity),
}
