//! Authenticated user identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Profile returned by the authentication endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Numeric user identifier.
    #[serde(default)]
    pub id: u64,
    /// Login name.
    pub username: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub last_name: String,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl UserProfile {
    /// Minimal profile carrying only a username.
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            image: None,
        }
    }
}

/// Bearer token issued on login.
///
/// `Debug` output is redacted so tokens never reach logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token string for transport headers and storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// A user together with the token that authenticates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Authenticated profile.
    pub user: UserProfile,
    /// Token proving the authentication.
    pub token: AccessToken,
}

impl AuthenticatedUser {
    /// Pair a profile with its token.
    pub fn new(user: UserProfile, token: AccessToken) -> Self {
        Self { user, token }
    }
}
