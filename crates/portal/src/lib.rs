//! Account portal library.
//!
//! Registration, login, social sign-in and profile completion on top of a
//! hosted auth-and-database backend. The router is built here so the binary
//! and the integration tests share it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod pkce;
pub mod routes;
pub mod services;
pub mod state;
pub mod supabase;

use axum::{Router, extract::Request};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full application router.
///
/// `/auth` routes are mounted as given by [`routes::auth_routes`], without
/// rate limiting.
pub fn app(state: AppState) -> Router {
    app_with_auth(state, routes::auth_routes())
}

/// Build the full application router around a prepared `/auth` router.
///
/// The binary passes `auth_routes()` wrapped in the rate limiter.
pub fn app_with_auth(state: AppState, auth: Router<AppState>) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    routes::routes()
        .nest("/auth", auth)
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
