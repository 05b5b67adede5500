//! Authentication extractors.
//!
//! Provides the guard used by the profile-completion and dashboard pages.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::debug;

use crate::models::AuthSession;
use crate::services::auth::{AuthService, OFFLINE_EMAIL};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// Reads the stored session, refreshing it when expired. If there is no
/// session, or reading it fails, the request is redirected to the login page.
/// In offline mode every visitor passes with the placeholder identity.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(user: SignedIn) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct SignedIn {
    /// Email shown on guarded pages.
    pub email: String,
    /// Backend session; `None` in offline mode.
    pub session: Option<AuthSession>,
}

/// Rejection returned when a guarded page is requested without a session.
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/").into_response(),
        }
    }
}

impl FromRequestParts<AppState> for SignedIn {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.backend_configured() {
            return Ok(Self {
                email: OFFLINE_EMAIL.to_string(),
                session: None,
            });
        }

        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::RedirectToLogin)?;

        match AuthService::new(state, &session).current_session().await {
            Ok(Some(auth)) => Ok(Self {
                email: auth.email().to_string(),
                session: Some(auth),
            }),
            Ok(None) => Err(AuthRejection::RedirectToLogin),
            Err(e) => {
                debug!(error = %e, "Session check failed, treating as signed out");
                Err(AuthRejection::RedirectToLogin)
            }
        }
    }
}
