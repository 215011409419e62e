//! App Context

use std::{fmt, path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::{
    api::{ApiClient, ApiConfig, ApiError},
    auth::{AuthSession, AuthSessionError, HttpAuthService},
    carts::{CartSession, CartSessionError, HttpCartStore},
    checkout::Checkout,
    orders::{HttpOrdersService, OrdersService},
    products::{HttpProductsService, ProductsService},
    storage::{FileKeyValueStore, KeyValueStore},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to build api client")]
    Api(#[source] ApiError),

    #[error("failed to restore auth session")]
    Auth(#[source] AuthSessionError),

    #[error("failed to restore cart session")]
    Cart(#[source] CartSessionError),
}

/// Every storefront collaborator, wired to one API client and one state file.
#[derive(Clone)]
pub struct AppContext {
    /// Shared HTTP client; carries the access token once logged in.
    pub api: ApiClient,
    /// Catalog browsing.
    pub products: Arc<dyn ProductsService>,
    /// Order history and payment.
    pub orders: Arc<dyn OrdersService>,
    /// Order handoff to the payment provider.
    pub checkout: Checkout,
    /// Persisted login state.
    pub auth: Arc<AuthSession>,
    /// The active cart.
    pub cart: Arc<CartSession>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("api", &self.api)
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context, restoring sessions from `state_file`.
    ///
    /// # Errors
    ///
    /// Returns an error when the API client cannot be built or the state
    /// file cannot be read.
    pub async fn from_config(
        config: ApiConfig,
        state_file: impl Into<PathBuf>,
    ) -> Result<Self, AppInitError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(state_file));

        Self::with_storage(config, storage).await
    }

    /// Build application context over an arbitrary storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error when the API client cannot be built or storage cannot
    /// be read.
    pub async fn with_storage(
        config: ApiConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppInitError> {
        let api = ApiClient::new(config).map_err(AppInitError::Api)?;

        let auth = AuthSession::restore(
            Arc::new(HttpAuthService::new(api.clone())),
            storage.clone(),
            api.clone(),
        )
        .await
        .map_err(AppInitError::Auth)?;

        let cart = CartSession::restore(Arc::new(HttpCartStore::new(api.clone())), storage)
            .await
            .map_err(AppInitError::Cart)?;

        let orders: Arc<dyn OrdersService> = Arc::new(HttpOrdersService::new(api.clone()));

        Ok(Self {
            products: Arc::new(HttpProductsService::new(api.clone())),
            checkout: Checkout::new(orders.clone()),
            orders,
            auth: Arc::new(auth),
            cart: Arc::new(cart),
            api,
        })
    }
}
