//! Remote cart store.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    api::ApiClient,
    carts::{
        errors::CartStoreError,
        models::{CartId, CartSnapshot, LineId, Quantity},
    },
    products::models::ProductId,
};

/// Cart store backed by the storefront REST API.
#[derive(Debug, Clone)]
pub struct HttpCartStore {
    api: ApiClient,
}

impl HttpCartStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedCart {
    cart_id: CartId,
}

#[derive(Debug, Serialize)]
struct AddLineItemRequest<'a> {
    product_id: &'a ProductId,
    quantity: Quantity,
}

#[derive(Debug, Serialize)]
struct UpdateLineItemRequest {
    quantity: Quantity,
}

#[async_trait]
impl CartStore for HttpCartStore {
    async fn create_cart(&self) -> Result<CartId, CartStoreError> {
        let created: CreatedCart = self.api.post("/api/carts/", &json!({})).await?;

        Ok(created.cart_id)
    }

    async fn get_cart(&self, cart: &CartId) -> Result<CartSnapshot, CartStoreError> {
        Ok(self.api.get(&format!("/api/carts/{cart}/")).await?)
    }

    async fn add_line_item(
        &self,
        cart: &CartId,
        product: &ProductId,
        quantity: Quantity,
    ) -> Result<(), CartStoreError> {
        let body = AddLineItemRequest {
            product_id: product,
            quantity,
        };

        Ok(self
            .api
            .post_unit(&format!("/api/carts/{cart}/items/"), &body)
            .await?)
    }

    async fn update_line_item(
        &self,
        cart: &CartId,
        line: &LineId,
        quantity: Quantity,
    ) -> Result<(), CartStoreError> {
        Ok(self
            .api
            .patch_unit(
                &format!("/api/carts/{cart}/items/{line}/"),
                &UpdateLineItemRequest { quantity },
            )
            .await?)
    }

    async fn delete_line_item(&self, cart: &CartId, line: &LineId) -> Result<(), CartStoreError> {
        Ok(self
            .api
            .delete(&format!("/api/carts/{cart}/items/{line}/"))
            .await?)
    }
}

/// The server-held cart resource the session reconciles against.
#[automock]
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Create an empty cart and return its identifier.
    async fn create_cart(&self) -> Result<CartId, CartStoreError>;

    /// Fetch a cart. Fails with `NotFound` once the cart has expired or been consumed.
    async fn get_cart(&self, cart: &CartId) -> Result<CartSnapshot, CartStoreError>;

    /// Add a product to a cart. The store merges quantities for a product
    /// that already has a line.
    async fn add_line_item(
        &self,
        cart: &CartId,
        product: &ProductId,
        quantity: Quantity,
    ) -> Result<(), CartStoreError>;

    /// Replace the quantity of an existing line.
    async fn update_line_item(
        &self,
        cart: &CartId,
        line: &LineId,
        quantity: Quantity,
    ) -> Result<(), CartStoreError>;

    /// Remove a line from a cart.
    async fn delete_line_item(&self, cart: &CartId, line: &LineId) -> Result<(), CartStoreError>;
}
