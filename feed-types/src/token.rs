//! OAuth token endpoint response.

use serde::Deserialize;
use std::fmt;

use crate::error::WireError;

/// Body returned by `POST /oauth/token` for the `authorization_code` grant.
///
/// Only `access_token` and `token_type` are required; the remaining fields
/// are informational and tolerated when absent.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for subsequent API calls.
    pub access_token: String,
    /// Token type, `"bearer"` in practice.
    pub token_type: String,
    /// Refresh token (unused, refresh is not supported).
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
    /// Issue time as a Unix timestamp.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Numeric id of the authorizing user.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Username of the authorizing user.
    #[serde(default)]
    pub username: Option<String>,
}

impl TokenResponse {
    /// Decode from a JSON body.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        let response: Self = serde_json::from_slice(bytes)?;
        if response.access_token.trim().is_empty() {
            return Err(WireError::EmptyField("access_token"));
        }
        Ok(response)
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("scope", &self.scope)
            .field("created_at", &self.created_at)
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .finish()
    }
}
