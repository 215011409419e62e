//! Checkout handoff.
//!
//! Turns the active cart into an order and hands off to the payment
//! provider. The server consumes the cart when the order is created, so a
//! successful handoff forgets the cart locally.

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

use crate::{
    auth::AuthSession,
    carts::CartSession,
    orders::{OrderId, OrdersService, OrdersServiceError},
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("log in before checking out")]
    NotAuthenticated,

    #[error("cart is empty")]
    EmptyCart,

    #[error("failed to create checkout session for order {0}")]
    MissingSessionUrl(OrderId),

    #[error(transparent)]
    Orders(#[from] OrdersServiceError),
}

/// Where to send the user to pay for a freshly created order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutHandoff {
    pub order_id: OrderId,
    pub session_url: String,
}

/// Hands a cart over to the payment provider as a new order.
#[derive(Clone)]
pub struct Checkout {
    orders: Arc<dyn OrdersService>,
}

impl fmt::Debug for Checkout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout").finish_non_exhaustive()
    }
}

impl Checkout {
    #[must_use]
    pub fn new(orders: Arc<dyn OrdersService>) -> Self {
        Self { orders }
    }

    /// Create an order from the cart and open a payment session for it.
    ///
    /// # Errors
    ///
    /// Fails when nobody is logged in, the cart is empty, order creation or
    /// payment fails, or the provider returns no session URL. The cart session
    /// is only discarded on success, and a failure to discard it does not
    /// fail the handoff.
    #[instrument(name = "checkout.begin", skip_all, fields(cart_id = field::Empty, order_id = field::Empty), err)]
    pub async fn begin(
        &self,
        cart: &CartSession,
        auth: &AuthSession,
    ) -> Result<CheckoutHandoff, CheckoutError> {
        if !auth.is_authenticated() {
            return Err(CheckoutError::NotAuthenticated);
        }

        let cart_id = cart.identifier().ok_or(CheckoutError::EmptyCart)?;

        if cart.snapshot().is_none_or(|snapshot| snapshot.is_empty()) {
            return Err(CheckoutError::EmptyCart);
        }

        Span::current().record("cart_id", field::display(&cart_id));

        let order_id = self.orders.create_order(&cart_id).await?;

        Span::current().record("order_id", field::display(&order_id));

        let payment = self.orders.pay(&order_id).await?;

        let Some(session_url) = payment.session_url.filter(|url| !url.is_empty()) else {
            return Err(CheckoutError::MissingSessionUrl(order_id));
        };

        if let Err(error) = cart.discard_session_locally().await {
            warn!(%error, %order_id, "failed to forget consumed cart");
        }

        info!(%order_id, "handing off to payment provider");

        Ok(CheckoutHandoff {
            order_id,
            session_url,
        })
    }
}
