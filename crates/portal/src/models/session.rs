//! Session-related types.
//!
//! Types stored in the session for authentication state.

use std::fmt;

use serde::{Deserialize, Serialize};

use account_portal_core::UserId;

/// Seconds before `expires_at` at which a session is treated as expired.
const EXPIRY_MARGIN_SECONDS: i64 = 10;

/// Identity of the signed-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Backend user ID.
    pub id: UserId,
    /// Email address, absent for some social accounts.
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated backend session.
///
/// Stored in the server-side session under [`keys::AUTH_SESSION`]. Implements
/// `Debug` manually to redact the tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token for user-scoped backend calls.
    pub access_token: String,
    /// Token used to obtain a fresh access token.
    pub refresh_token: String,
    /// Unix timestamp (seconds) at which `access_token` expires.
    pub expires_at: i64,
    /// The user this session belongs to.
    pub user: SessionUser,
}

impl AuthSession {
    /// Whether the access token is expired (or about to be) at `now`.
    #[must_use]
    pub const fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now + EXPIRY_MARGIN_SECONDS
    }

    /// The user's email, or an empty string if the backend has none.
    #[must_use]
    pub fn email(&self) -> &str {
        self.user.email.as_deref().unwrap_or_default()
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the signed-in user's backend session.
    pub const AUTH_SESSION: &str = "auth_session";

    /// Key for the PKCE verifier of an in-flight OAuth or sign-up redirect.
    pub const PKCE_VERIFIER: &str = "pkce_verifier";
}
