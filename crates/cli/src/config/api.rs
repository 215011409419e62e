//! API Client Config

use std::time::Duration;

use clap::Args;
use storefront_app::api::ApiConfig;

/// Storefront API connection settings.
#[derive(Debug, Args)]
pub(crate) struct ApiClientConfig {
    /// Storefront API base URL
    #[arg(
        long,
        env = "STOREFRONT_API_BASE",
        default_value = "http://localhost:8000",
        global = true
    )]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "STOREFRONT_REQUEST_TIMEOUT_SECONDS",
        default_value_t = 30u64,
        global = true
    )]
    pub request_timeout_seconds: u64,
}

impl ApiClientConfig {
    #[must_use]
    pub(crate) fn to_api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_seconds),
        }
    }
}
