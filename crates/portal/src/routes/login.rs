//! Login page and password sign-in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use account_portal_core::{LoginInput, OAuthProvider, ValidationErrors};

use super::AFTER_LOGIN;
use super::oauth::OAuthOrigin;
use crate::filters;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Cookie holding the email of a visitor who ticked "remember me".
pub const REMEMBERED_EMAIL_COOKIE: &str = "remembered_email";

/// Lifetime of the remembered-email cookie.
const REMEMBERED_EMAIL_MAX_AGE_DAYS: i64 = 365;

/// Banner text after a successful registration.
const REGISTERED_MESSAGE: &str = "Your account has been created successfully.";

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub success: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub remember_me: bool,
    pub errors: ValidationErrors,
    pub error: Option<String>,
    pub success: Option<&'static str>,
    pub providers: &'static [OAuthProvider],
    pub origin: &'static str,
}

impl LoginTemplate {
    /// An empty form with `email` pre-filled.
    #[must_use]
    pub fn new(email: String, remember_me: bool) -> Self {
        Self {
            email,
            remember_me,
            errors: ValidationErrors::new(),
            error: None,
            success: None,
            providers: &OAuthProvider::ALL,
            origin: OAuthOrigin::Login.as_str(),
        }
    }

    /// The form showing an error from the backend.
    #[must_use]
    pub fn with_error(email: String, remember_me: bool, message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::new(email, remember_me)
        }
    }
}

/// Display the login page.
///
/// GET /
///
/// Pre-fills the email and ticks "remember me" when the remembered-email
/// cookie is present.
pub async fn login_page(Query(query): Query<LoginPageQuery>, jar: CookieJar) -> impl IntoResponse {
    let remembered = jar
        .get(REMEMBERED_EMAIL_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|email| !email.is_empty());
    let remember_me = remembered.is_some();

    let mut page = LoginTemplate::new(remembered.unwrap_or_default(), remember_me);
    if query.success.as_deref() == Some("registered") {
        page.success = Some(REGISTERED_MESSAGE);
    }
    page
}

/// Handle login form submission.
///
/// POST /auth/login
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(input): Form<LoginInput>,
) -> Response {
    let credentials = match input.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let page = LoginTemplate {
                errors,
                ..LoginTemplate::new(input.email.clone(), input.remember_me)
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, page).into_response();
        }
    };

    if let Err(e) = AuthService::new(&state, &session).login(&credentials).await {
        warn!(error = %e, "Login failed");
        return LoginTemplate::with_error(input.email, input.remember_me, e.message())
            .into_response();
    }

    let jar = if credentials.remember_me {
        jar.add(remembered_email_cookie(
            credentials.email.as_str(),
            state.config().secure_cookies(),
        ))
    } else {
        jar.remove(Cookie::build(REMEMBERED_EMAIL_COOKIE).path("/"))
    };

    info!("Login succeeded, continuing to profile completion");
    (jar, Redirect::to(AFTER_LOGIN)).into_response()
}

fn remembered_email_cookie(email: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((REMEMBERED_EMAIL_COOKIE, email.to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(true)
        .secure(secure)
        .max_age(tower_sessions::cookie::time::Duration::days(
            REMEMBERED_EMAIL_MAX_AGE_DAYS,
        ))
        .build()
}
