//! Cart Models

use std::{fmt, num::NonZeroU32};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    carts::errors::InvalidQuantity,
    ids::TypedId,
    products::models::ProductId,
};

/// Cart identifier, persisted between runs.
pub type CartId = TypedId<CartSnapshot>;

/// Cart line item identifier.
pub type LineId = TypedId<CartLineItem>;

/// A line item quantity. Never below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// # Errors
    ///
    /// Returns [`InvalidQuantity`] for zero.
    pub const fn new(value: u32) -> Result<Self, InvalidQuantity> {
        match NonZeroU32::new(value) {
            Some(value) => Ok(Self(value)),
            None => Err(InvalidQuantity),
        }
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    #[must_use]
    pub const fn increment(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One less, clamped at one.
    #[must_use]
    pub const fn decrement(self) -> Self {
        match NonZeroU32::new(self.0.get() - 1) {
            Some(value) => Self(value),
            None => self,
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = InvalidQuantity;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.get()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The product fields embedded in a cart line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
}

/// CartLineItem Model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartLineItem {
    pub id: LineId,
    pub product: ProductSummary,
    pub quantity: Quantity,
    #[serde(rename = "sub_total")]
    pub subtotal: Decimal,
}

/// The last fetched server view of a cart.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartSnapshot {
    #[serde(rename = "cart_id")]
    pub id: CartId,
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    #[serde(default)]
    pub grand_total: Decimal,
}

impl CartSnapshot {
    #[must_use]
    pub fn find_line(&self, line: &LineId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.id == line)
    }

    #[must_use]
    pub fn find_line_by_product(&self, product: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.product.id == product)
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
