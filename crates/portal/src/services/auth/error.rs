//! Authentication error types.

use thiserror::Error;

use crate::supabase::SupabaseError;

/// Message shown when sign-up finds an existing `Customer` row.
pub const ACCOUNT_EXISTS_MESSAGE: &str =
    "Email already in use. Please use a different email or sign in.";

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// An account with this email already exists.
    #[error("account already exists")]
    AccountExists,

    /// The backend rejected the call or could not be reached.
    #[error("backend error: {0}")]
    Backend(#[from] SupabaseError),

    /// A code arrived at the callback but no verifier was stored for it.
    #[error("no PKCE verifier in session")]
    MissingVerifier,

    /// The operation needs a signed-in user and there is none.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The server-side session could not be read or written.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Text suitable for showing inline on a form or the callback page.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::AccountExists => ACCOUNT_EXISTS_MESSAGE.to_string(),
            Self::Backend(e) => e.message(),
            Self::MissingVerifier => {
                "Your sign-in link has expired. Please sign in again.".to_string()
            }
            Self::NotAuthenticated => "Please sign in to continue.".to_string(),
            Self::Session(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}
