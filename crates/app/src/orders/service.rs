//! Orders service.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    api::{ApiClient, Listing},
    carts::models::CartId,
    orders::{
        errors::OrdersServiceError,
        models::{Order, OrderId, PaymentSession},
    },
};

#[derive(Debug, Clone)]
pub struct HttpOrdersService {
    api: ApiClient,
}

impl HttpOrdersService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    cart_id: &'a CartId,
}

#[derive(Debug, Deserialize)]
struct CreatedOrder {
    id: OrderId,
}

#[derive(Debug, Deserialize)]
struct PaymentConfirmation {
    data: Order,
}

#[async_trait]
impl OrdersService for HttpOrdersService {
    async fn create_order(&self, cart: &CartId) -> Result<OrderId, OrdersServiceError> {
        let created: CreatedOrder = self
            .api
            .post("/api/orders/", &CreateOrderRequest { cart_id: cart })
            .await?;

        Ok(created.id)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, OrdersServiceError> {
        let listing: Listing<Order> = self.api.get("/api/orders/").await?;

        Ok(listing.into_items())
    }

    async fn pay(&self, order: &OrderId) -> Result<PaymentSession, OrdersServiceError> {
        Ok(self
            .api
            .post(&format!("/api/orders/{order}/pay/"), &json!({}))
            .await?)
    }

    async fn confirm_payment(&self, order: &OrderId) -> Result<Order, OrdersServiceError> {
        let confirmation: PaymentConfirmation = self
            .api
            .get(&format!("/api/orders/{order}/success_payment/"))
            .await?;

        Ok(confirmation.data)
    }
}

/// Orders placed by the logged-in user.
#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turn a cart into an order. The server consumes the cart.
    async fn create_order(&self, cart: &CartId) -> Result<OrderId, OrdersServiceError>;

    /// Order history, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, OrdersServiceError>;

    /// Open a payment session for a pending order.
    async fn pay(&self, order: &OrderId) -> Result<PaymentSession, OrdersServiceError>;

    /// Mark an order paid after the payment provider redirects back.
    async fn confirm_payment(&self, order: &OrderId) -> Result<Order, OrdersServiceError>;
}
