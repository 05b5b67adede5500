//! Wire types for the auth endpoints.

use serde::{Deserialize, Serialize};

use crate::models::{AuthSession, SessionUser};

/// Body for `grant_type=password`.
#[derive(Serialize)]
pub(super) struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body for `grant_type=pkce`.
#[derive(Serialize)]
pub(super) struct PkceGrant<'a> {
    pub auth_code: &'a str,
    pub code_verifier: &'a str,
}

/// Body for `grant_type=refresh_token`.
#[derive(Serialize)]
pub(super) struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

/// Body for `/signup`.
#[derive(Serialize)]
pub(super) struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub code_challenge: &'a str,
    pub code_challenge_method: &'a str,
}

/// Session returned by the token endpoints.
#[derive(Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: SessionUser,
}

impl TokenResponse {
    /// Convert into a stored session, computing the expiry from `now` when the
    /// backend only sent `expires_in`.
    pub fn into_session(self, now: i64) -> AuthSession {
        AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_at.unwrap_or(now + self.expires_in),
            user: self.user,
        }
    }
}

/// Raw `/signup` response: a session when the project auto-confirms, the bare
/// user when email confirmation is pending.
#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum SignUpResponse {
    Session(TokenResponse),
    User(SessionUser),
}

/// Outcome of a successful sign-up.
#[derive(Debug, Clone)]
pub enum SignUpResult {
    /// The account is live and signed in.
    Session(AuthSession),
    /// The account was created and awaits email confirmation.
    PendingConfirmation(SessionUser),
}

impl SignUpResult {
    /// The created user.
    #[must_use]
    pub const fn user(&self) -> &SessionUser {
        match self {
            Self::Session(session) => &session.user,
            Self::PendingConfirmation(user) => user,
        }
    }
}
