//! CLI errors.

use std::{error::Error as StdError, io};

use storefront_app::{
    auth::AuthSessionError, carts::CartSessionError, checkout::CheckoutError,
    context::AppInitError, orders::OrdersServiceError, products::ProductsServiceError,
};
use thiserror::Error;

use crate::observability::ObservabilityError;

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error(transparent)]
    Init(#[from] AppInitError),

    #[error(transparent)]
    Cart(#[from] CartSessionError),

    #[error(transparent)]
    Auth(#[from] AuthSessionError),

    #[error(transparent)]
    Products(#[from] ProductsServiceError),

    #[error(transparent)]
    Orders(#[from] OrdersServiceError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error("failed to write output")]
    Output(#[from] io::Error),
}

/// One line naming the error and every cause beneath it.
pub(crate) fn report(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        let cause_message = cause.to_string();

        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }

        source = cause.source();
    }

    message
}
