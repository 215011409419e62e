//! Test helpers.

use rust_decimal::Decimal;

use crate::{
    api::ApiError,
    carts::{
        CartStoreError,
        models::{CartId, CartLineItem, CartSnapshot, LineId, ProductSummary, Quantity},
    },
    products::models::ProductId,
};

pub(crate) const UNIT_PRICE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Build a snapshot from `(line, product, quantity)` triples priced at
/// [`UNIT_PRICE`].
pub(crate) fn snapshot(cart: &str, lines: &[(&str, &str, u32)]) -> CartSnapshot {
    let items: Vec<CartLineItem> = lines
        .iter()
        .map(|&(line, product, quantity)| CartLineItem {
            id: LineId::from(line),
            product: ProductSummary {
                id: ProductId::from(product),
                name: product.to_uppercase(),
                price: UNIT_PRICE,
            },
            quantity: Quantity::new(quantity).expect("test quantities are positive"),
            subtotal: UNIT_PRICE * Decimal::from(quantity),
        })
        .collect();

    CartSnapshot {
        id: CartId::from(cart),
        grand_total: items.iter().map(|item| item.subtotal).sum(),
        items,
    }
}

pub(crate) fn transport_error() -> CartStoreError {
    CartStoreError::Transport(ApiError::UnexpectedResponse {
        status: 503,
        body: "service unavailable".to_string(),
    })
}
