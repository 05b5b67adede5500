//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Login page (?success=registered shows banner)
//! GET  /signup                  - Sign-up page
//! GET  /profile-completion      - Profile form (requires session)
//! POST /profile-completion      - Save profile
//! GET  /dashboard               - Dashboard (requires session)
//! GET  /health                  - Health check
//! GET  /static/*                - Stylesheet and assets
//!
//! # Auth
//! POST /auth/login              - Password sign-in
//! POST /auth/signup             - Registration
//! POST /auth/oauth/{provider}   - Start Google or Facebook sign-in
//! GET  /auth/callback           - OAuth and email-confirmation landing
//! POST /auth/logout             - Sign out
//!
//! Anything else redirects to /.
//! ```

pub mod callback;
pub mod dashboard;
pub mod login;
pub mod oauth;
pub mod profile;
pub mod signup;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Where a successful sign-in continues.
pub const AFTER_LOGIN: &str = "/profile-completion";

/// Where a successful sign-up continues.
pub const AFTER_SIGN_UP: &str = "/?success=registered";

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login::login))
        .route("/signup", post(signup::signup))
        .route("/oauth/{provider}", post(oauth::start))
        .route("/callback", get(callback::callback))
        .route("/logout", post(dashboard::logout))
}

/// Create the page routes router.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(login::login_page))
        .route("/signup", get(signup::signup_page))
        .route(
            "/profile-completion",
            get(profile::profile_page).post(profile::submit_profile),
        )
        .route("/dashboard", get(dashboard::dashboard))
}

/// Create all routes for the portal.
///
/// `/auth` is left to the caller so it can wrap it in a rate limiter.
pub fn routes() -> Router<AppState> {
    page_routes()
        .route("/health", get(health))
        .fallback(fallback)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Unknown paths go back to the login page.
async fn fallback() -> Redirect {
    Redirect::to("/")
}
