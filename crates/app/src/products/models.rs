//! Product Models

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::ids::TypedId;

/// Product identifier.
pub type ProductId = TypedId<Product>;

/// Product image identifier.
pub type ProductImageId = TypedId<ProductImage>;

/// Product Model
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub old_price: Option<Decimal>,
    pub price: Decimal,
    #[serde(default)]
    pub inventory: Option<u32>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Path of the first image, if any, as returned by the API.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(|image| image.image.as_str())
    }
}

/// ProductImage Model
#[derive(Debug, Clone, Deserialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub image: String,
}
