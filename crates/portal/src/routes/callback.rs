//! OAuth and email-confirmation landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use super::AFTER_LOGIN;
use crate::filters;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Seconds the error page waits before returning to the login page.
const ERROR_REDIRECT_SECONDS: u64 = 3;

/// Query parameters the backend appends when redirecting back.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Authentication error page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/callback.html")]
pub struct CallbackErrorTemplate {
    pub message: String,
    pub redirect_seconds: u64,
}

/// Handle the redirect back from a provider or a confirmation email.
///
/// GET /auth/callback
///
/// Signed in afterwards: continue to profile completion. No session: back to
/// login. Any error: show it, then return to login after a short pause.
#[instrument(skip_all, fields(has_code = query.code.is_some(), has_error = query.error.is_some()))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    match complete(&state, &session, query).await {
        Ok(true) => Redirect::to(AFTER_LOGIN).into_response(),
        Ok(false) => Redirect::to("/").into_response(),
        Err(message) => {
            warn!(%message, "Authentication callback failed");
            CallbackErrorTemplate {
                message,
                redirect_seconds: ERROR_REDIRECT_SECONDS,
            }
            .into_response()
        }
    }
}

/// Returns whether a session exists afterwards, or the message to show.
async fn complete(
    state: &AppState,
    session: &Session,
    query: CallbackQuery,
) -> Result<bool, String> {
    if let Some(error) = query.error {
        return Err(query
            .error_description
            .filter(|d| !d.is_empty())
            .unwrap_or(error));
    }

    let auth = AuthService::new(state, session);

    if let Some(code) = query.code.as_deref() {
        auth.exchange_code(code).await.map_err(|e| e.message())?;
    }

    let current = auth.current_session().await.map_err(|e| e.message())?;
    Ok(current.is_some())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_page_refreshes_to_login() {
        let html = CallbackErrorTemplate {
            message: "Email link is invalid or has expired".to_string(),
            redirect_seconds: ERROR_REDIRECT_SECONDS,
        }
        .render()
        .unwrap();

        assert!(html.contains(r#"<meta http-equiv="refresh" content="3;url=/">"#));
        assert!(html.contains("Authentication Error"));
        assert!(html.contains("Email link is invalid or has expired"));
    }
}
