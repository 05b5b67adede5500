//! Sign-up page and account registration.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use account_portal_core::{OAuthProvider, SignUpInput, ValidationErrors};

use super::AFTER_SIGN_UP;
use super::oauth::OAuthOrigin;
use crate::filters;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignUpTemplate {
    pub email: String,
    pub accept_terms: bool,
    pub errors: ValidationErrors,
    pub error: Option<String>,
    pub providers: &'static [OAuthProvider],
    pub origin: &'static str,
}

impl SignUpTemplate {
    /// An empty form with `email` pre-filled. Passwords are never echoed back.
    #[must_use]
    pub fn new(email: String, accept_terms: bool) -> Self {
        Self {
            email,
            accept_terms,
            errors: ValidationErrors::new(),
            error: None,
            providers: &OAuthProvider::ALL,
            origin: OAuthOrigin::Signup.as_str(),
        }
    }

    /// The form showing an error from the backend.
    #[must_use]
    pub fn with_error(email: String, accept_terms: bool, message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::new(email, accept_terms)
        }
    }
}

/// Display the sign-up page.
///
/// GET /signup
pub async fn signup_page() -> impl IntoResponse {
    SignUpTemplate::new(String::new(), false)
}

/// Handle sign-up form submission.
///
/// POST /auth/signup
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(input): Form<SignUpInput>,
) -> Response {
    let credentials = match input.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let page = SignUpTemplate {
                errors,
                ..SignUpTemplate::new(input.email.clone(), input.accept_terms)
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, page).into_response();
        }
    };

    if let Err(e) = AuthService::new(&state, &session).sign_up(&credentials).await {
        warn!(error = %e, "Sign-up failed");
        return SignUpTemplate::with_error(input.email, input.accept_terms, e.message())
            .into_response();
    }

    info!("Sign-up succeeded");
    Redirect::to(AFTER_SIGN_UP).into_response()
}
