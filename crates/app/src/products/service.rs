//! Products service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    api::{ApiClient, Listing},
    products::{
        errors::ProductsServiceError,
        models::{Product, ProductId},
    },
};

/// A page of catalog results.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub has_next: bool,
}

#[derive(Debug, Clone)]
pub struct HttpProductsService {
    api: ApiClient,
}

impl HttpProductsService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ProductsService for HttpProductsService {
    async fn list_products(&self, page: u32) -> Result<ProductPage, ProductsServiceError> {
        let listing: Listing<Product> = self
            .api
            .get(&format!("/api/products/?page={}", page.max(1)))
            .await?;

        let has_next = listing.has_next();

        Ok(ProductPage {
            products: listing.into_items(),
            has_next,
        })
    }

    async fn get_product(&self, product: &ProductId) -> Result<Product, ProductsServiceError> {
        Ok(self.api.get(&format!("/api/products/{product}/")).await?)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// List one page of the catalog, starting at page 1.
    async fn list_products(&self, page: u32) -> Result<ProductPage, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: &ProductId) -> Result<Product, ProductsServiceError>;
}
