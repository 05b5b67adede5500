//! Dashboard and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::SignedIn;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/dashboard.html")]
pub struct DashboardTemplate {
    pub email: String,
}

/// Display the dashboard.
///
/// GET /dashboard
pub async fn dashboard(user: SignedIn) -> impl IntoResponse {
    DashboardTemplate { email: user.email }
}

/// Sign out and return to the login page, whatever the backend says.
///
/// POST /auth/logout
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    AuthService::new(&state, &session).logout().await;
    Redirect::to("/")
}
