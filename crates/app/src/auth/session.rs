//! Persisted login state.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::{info, instrument};

use crate::{
    api::ApiClient,
    auth::{AccessToken, AuthService, AuthSessionError, NewUser, User},
    storage::KeyValueStore,
};

/// Storage key holding the access token.
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the remembered user as JSON.
pub const USER_KEY: &str = "user";

#[derive(Default)]
struct AuthState {
    token: Option<AccessToken>,
    user: Option<User>,
}

/// Owns the access token and installs it on the shared API client.
pub struct AuthSession {
    service: Arc<dyn AuthService>,
    storage: Arc<dyn KeyValueStore>,
    api: ApiClient,
    state: Mutex<AuthState>,
}

impl AuthSession {
    /// Build a session from whatever a previous run left in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or the stored user is
    /// not valid JSON.
    pub async fn restore(
        service: Arc<dyn AuthService>,
        storage: Arc<dyn KeyValueStore>,
        api: ApiClient,
    ) -> Result<Self, AuthSessionError> {
        let token = storage.get(TOKEN_KEY).await?.map(AccessToken::new);

        let user = storage
            .get(USER_KEY)
            .await?
            .map(|raw| serde_json::from_str::<User>(&raw))
            .transpose()
            .map_err(AuthSessionError::CorruptUser)?;

        api.set_token(token.as_ref().map(AccessToken::as_str));

        Ok(Self {
            service,
            storage,
            api,
            state: Mutex::new(AuthState { token, user }),
        })
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().token.is_some()
    }

    /// Exchange credentials for a token and remember it.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the session
    /// cannot be persisted.
    #[instrument(name = "auth_session.login", skip(self, password), err)]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthSessionError> {
        let issued = self.service.create_token(email, password).await?;

        let user = User {
            email: email.to_string(),
        };

        let encoded = serde_json::to_string(&user).map_err(AuthSessionError::CorruptUser)?;

        self.storage.set(TOKEN_KEY, issued.access.as_str()).await?;
        self.storage.set(USER_KEY, &encoded).await?;

        self.api.set_token(Some(issued.access.as_str()));

        {
            let mut state = self.state();

            state.token = Some(issued.access);
            state.user = Some(user.clone());
        }

        info!(email, "logged in");

        Ok(user)
    }

    /// Create an account, then log straight in.
    ///
    /// # Errors
    ///
    /// Returns an error if registration or the following login fails.
    #[instrument(name = "auth_session.register", skip(self, user, password), fields(email = %user.email), err)]
    pub async fn register(&self, user: &NewUser, password: &str) -> Result<User, AuthSessionError> {
        self.service.register(user, password).await?;

        self.login(&user.email, password).await
    }

    /// Forget the token and user.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be cleared. The in-memory session
    /// and API client are cleared regardless.
    #[instrument(name = "auth_session.logout", skip(self), err)]
    pub async fn logout(&self) -> Result<(), AuthSessionError> {
        {
            let mut state = self.state();

            state.token = None;
            state.user = None;
        }

        self.api.set_token(None);

        self.storage.remove(TOKEN_KEY).await?;
        self.storage.remove(USER_KEY).await?;

        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
