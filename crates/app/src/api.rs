//! Storefront REST API client.

use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;
use zeroize::Zeroizing;

/// Scheme used in the `Authorization` header for issued access tokens.
pub const AUTH_SCHEME: &str = "JWT";

/// Configuration for connecting to the storefront API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base address, e.g. `"http://localhost:8000"`.
    pub base_url: String,

    /// Per-request timeout applied by the transport.
    pub timeout: Duration,
}

/// HTTP client shared by every storefront collaborator.
///
/// Cloning is cheap and clones share the installed access token, so logging in
/// through one handle authenticates all of them.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    token: Arc<RwLock<Option<Zeroizing<String>>>>,
}

impl ApiClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            token: Arc::new(RwLock::new(None)),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install or clear the access token sent with every request.
    pub fn set_token(&self, token: Option<&str>) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);

        *slot = token.map(|token| Zeroizing::new(token.to_string()));
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an
    /// undecodable body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;

        Ok(response.json().await?)
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an
    /// undecodable body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;

        Ok(response.json().await?)
    }

    /// `POST` a JSON body, discarding the response body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(self.request(Method::POST, path).json(body))
            .await?;

        Ok(())
    }

    /// `PATCH` a JSON body, discarding the response body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    pub async fn patch_unit<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(self.request(Method::PATCH, path).json(body))
            .await?;

        Ok(())
    }

    /// `DELETE` a resource.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await?;

        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));

        let token = self.token.read().unwrap_or_else(PoisonError::into_inner);

        match token.as_ref() {
            Some(token) => builder.header(
                reqwest::header::AUTHORIZATION,
                format!("{AUTH_SCHEME} {}", token.as_str()),
            ),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();

        tracing::debug!(status = status.as_u16(), body = %text, "api request failed");

        Err(error_for_status(status, &text))
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.has_token())
            .finish_non_exhaustive()
    }
}

/// Resolve a media path returned by the API into an absolute URL.
///
/// Absolute `http(s)` URLs pass through untouched; empty paths stay empty.
#[must_use]
pub fn media_url(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }

    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base_url = base_url.trim_end_matches('/');

    if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

/// A list endpoint response, either paginated or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paginated {
        count: u64,
        next: Option<String>,
        previous: Option<String>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paginated { results, .. } => results,
            Self::Bare(items) => items,
        }
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        matches!(self, Self::Paginated { next: Some(_), .. })
    }
}

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport or body decoding error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The addressed resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// The request was rejected as invalid.
    #[error("{0}")]
    Invalid(String),

    /// Credentials were missing or rejected.
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// The API returned a non-2xx status not covered above.
    #[error("unexpected response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },
}

pub(crate) fn error_for_status(status: StatusCode, body: &str) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::BAD_REQUEST => ApiError::Invalid(
            extract_message(body).unwrap_or_else(|| "invalid request".to_string()),
        ),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(
            extract_message(body).unwrap_or_else(|| status.to_string()),
        ),
        _ => ApiError::UnexpectedResponse {
            status: status.as_u16(),
            body: body.trim().to_string(),
        },
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"error": ..}`, `{"detail": ..}`, field error maps such as
/// `{"quantity": ["..."]}` and bare arrays of messages.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();

    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };

    match value {
        Value::Object(map) => {
            for key in ["error", "detail"] {
                if let Some(message) = map.get(key).and_then(first_string) {
                    return Some(message);
                }
            }

            map.iter().find_map(|(field, value)| {
                first_string(value).map(|message| {
                    if field == "non_field_errors" {
                        message
                    } else {
                        format!("{field}: {message}")
                    }
                })
            })
        }
        other => first_string(&other),
    }
}

fn first_string(value: &Value) -> Option<String> {
    match value {
        Value::String(message) => Some(message.clone()),
        Value::Array(values) => values.iter().find_map(first_string),
        _ => None,
    }
}
