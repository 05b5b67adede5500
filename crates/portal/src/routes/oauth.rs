//! Social sign-in start.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use account_portal_core::OAuthProvider;

use super::login::LoginTemplate;
use super::signup::SignUpTemplate;
use super::{AFTER_LOGIN, AFTER_SIGN_UP};
use crate::error::AppError;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Page a social button was pressed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthOrigin {
    #[default]
    Login,
    Signup,
}

impl OAuthOrigin {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }

    /// Where an offline social sign-in lands.
    #[must_use]
    pub const fn success_path(self) -> &'static str {
        match self {
            Self::Login => AFTER_LOGIN,
            Self::Signup => AFTER_SIGN_UP,
        }
    }
}

/// Social button form data.
#[derive(Debug, Default, Deserialize)]
pub struct OAuthForm {
    #[serde(default)]
    pub origin: OAuthOrigin,
}

/// Start a social sign-in.
///
/// POST /auth/oauth/{provider}
///
/// Redirects to the provider's consent page through the backend. Offline, it
/// waits and then continues as if the provider had succeeded.
#[instrument(skip(state, session, form))]
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
    Form(form): Form<OAuthForm>,
) -> Result<Response, AppError> {
    let provider: OAuthProvider = provider
        .parse()
        .map_err(|e: account_portal_core::UnknownProvider| AppError::BadRequest(e.to_string()))?;

    match AuthService::new(&state, &session)
        .oauth_redirect(provider)
        .await
    {
        Ok(Some(url)) => Ok(Redirect::to(url.as_str()).into_response()),
        Ok(None) => Ok(Redirect::to(form.origin.success_path()).into_response()),
        Err(AuthError::Session(e)) => Err(AppError::Session(e)),
        Err(e) => {
            warn!(error = %e, %provider, "Social sign-in could not start");
            let message = e.message();
            Ok(match form.origin {
                OAuthOrigin::Login => {
                    LoginTemplate::with_error(String::new(), false, message).into_response()
                }
                OAuthOrigin::Signup => {
                    SignUpTemplate::with_error(String::new(), false, message).into_response()
                }
            })
        }
    }
}
