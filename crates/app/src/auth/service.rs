//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;

use crate::{
    api::ApiClient,
    auth::{AuthServiceError, IssuedTokens, NewUser},
};

#[derive(Debug, Clone)]
pub struct HttpAuthService {
    api: ApiClient,
}

impl HttpAuthService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    #[serde(flatten)]
    user: &'a NewUser,
    password: &'a str,
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn create_token(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedTokens, AuthServiceError> {
        Ok(self
            .api
            .post("/auth/jwt/create/", &TokenRequest { email, password })
            .await?)
    }

    async fn register(&self, user: &NewUser, password: &str) -> Result<(), AuthServiceError> {
        Ok(self
            .api
            .post_unit("/auth/users/", &RegisterRequest { user, password })
            .await?)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange credentials for an access token.
    async fn create_token(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedTokens, AuthServiceError>;

    /// Create a new account.
    async fn register(&self, user: &NewUser, password: &str) -> Result<(), AuthServiceError>;
}
