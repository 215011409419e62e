//! Auth Models

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// An issued access token. Zeroized on drop and redacted from debug output.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(**redacted**)")
    }
}

impl Drop for AccessToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Token pair returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuedTokens {
    pub access: AccessToken,
    #[serde(default)]
    pub refresh: Option<AccessToken>,
}

/// The locally remembered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}

/// Registration details.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_name: String,
}
