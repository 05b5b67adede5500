//! Integration test harness for the account portal.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no network beyond 127.0.0.1)
//! cargo test -p account-portal-integration-tests
//!
//! # Tests against a running portal
//! PORTAL_BASE_URL=http://localhost:3000 cargo test -p account-portal-integration-tests -- --ignored
//! ```
//!
//! # Pieces
//!
//! - [`TestApp`] drives the full router in-process and carries cookies
//!   between requests like a browser would.
//! - [`StubBackend`] is a tiny axum server standing in for the hosted backend.
//!   It answers the auth and table endpoints the portal calls, records every
//!   call, and can be told to fail specific ones.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use account_portal::config::PortalConfig;
use account_portal::state::AppState;
use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::{OriginalUri, State},
    http::{HeaderMap, Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use axum_extra::extract::cookie::Cookie;
use tower::ServiceExt;

/// User ID the stub backend hands out.
pub const STUB_USER_ID: &str = "5f1c2a9e-8d7b-4c3a-9e1f-0a2b3c4d5e6f";

/// Email the stub backend reports for its user.
pub const STUB_EMAIL: &str = "a@b.com";

/// Access token the stub backend hands out.
pub const STUB_ACCESS_TOKEN: &str = "stub-access-token";

// =============================================================================
// Portal under test
// =============================================================================

/// A response with its body read into a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The `Set-Cookie` header for `name`, if the response set one.
    #[must_use]
    pub fn set_cookie(&self, name: &str) -> Option<&str> {
        let prefix = format!("{name}=");
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&prefix))
    }

    /// Assert this is a `303 See Other` to `path`.
    pub fn assert_redirect(&self, path: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location(), Some(path));
    }
}

/// The portal router plus a browser-like cookie jar.
pub struct TestApp {
    router: Router,
    cookies: HashMap<String, String>,
}

impl TestApp {
    /// Portal with no backend configured.
    #[must_use]
    pub fn offline() -> Self {
        Self::from_vars(&[])
    }

    /// Portal pointed at `backend`.
    #[must_use]
    pub fn with_backend(backend: &StubBackend) -> Self {
        Self::from_vars(&[
            ("SUPABASE_URL", backend.url.as_str()),
            ("SUPABASE_ANON_KEY", "stub-anon-key"),
        ])
    }

    fn from_vars(vars: &[(&str, &str)]) -> Self {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let config = PortalConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let state = AppState::new(config).unwrap();

        Self {
            router: account_portal::app(state),
            cookies: HashMap::new(),
        }
    }

    /// Add a cookie as if the browser already had it. `value` is unencoded.
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    /// Current decoded value of a cookie in the jar.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if !self.cookies.is_empty() {
            let cookie_header = self
                .cookies
                .iter()
                .map(|(name, value)| {
                    Cookie::new(name.as_str(), value.as_str())
                        .encoded()
                        .to_string()
                })
                .collect::<Vec<_>>()
                .join("; ");
            request
                .headers_mut()
                .insert(header::COOKIE, cookie_header.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        for value in headers.get_all(header::SET_COOKIE) {
            self.store_cookie(value.to_str().unwrap());
        }

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn store_cookie(&mut self, set_cookie: &str) {
        let Ok(cookie) = Cookie::parse_encoded(set_cookie) else {
            return;
        };

        if cookie.max_age().is_some_and(|age| age.is_zero()) {
            self.cookies.remove(cookie.name());
        } else {
            self.cookies
                .insert(cookie.name().to_string(), cookie.value().to_string());
        }
    }
}

// =============================================================================
// Stub backend
// =============================================================================

/// Failure switches for the stub backend.
#[derive(Debug, Clone, Default)]
pub struct StubBehaviour {
    /// `Customer` lookup finds an existing row.
    pub existing_customer: bool,
    /// Password sign-in is rejected.
    pub reject_password: bool,
    /// Sign-up returns a live session instead of a pending user.
    pub sign_up_returns_session: bool,
    /// `Customer` insert fails.
    pub fail_customer_insert: bool,
    /// `Customer` profile upsert fails.
    pub fail_customer_upsert: bool,
    /// `profiles` upsert fails.
    pub fail_profile_upsert: bool,
    /// Code exchange fails.
    pub fail_code_exchange: bool,
    /// Sessions expire immediately, forcing a refresh on next use.
    pub short_lived_tokens: bool,
}

/// One request the stub backend received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
    pub authorization: Option<String>,
}

impl RecordedCall {
    /// `"METHOD /path"`, e.g. `"POST /auth/v1/token"`.
    #[must_use]
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Clone)]
struct StubState {
    behaviour: StubBehaviour,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// A running stub backend bound to `127.0.0.1` on a random port.
pub struct StubBackend {
    pub url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubBackend {
    /// Start a stub backend that succeeds at everything.
    pub async fn start() -> Self {
        Self::start_with(StubBehaviour::default()).await
    }

    /// Start a stub backend with the given failure switches.
    pub async fn start_with(behaviour: StubBehaviour) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            behaviour,
            calls: Arc::clone(&calls),
        };

        let app = Router::new().fallback(handle).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            calls,
        }
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls to `"METHOD /path"`.
    #[must_use]
    pub fn calls_to(&self, route: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.route() == route)
            .collect()
    }
}

async fn handle(
    State(stub): State<StubState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let call = RecordedCall {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        body,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    };
    stub.calls.lock().unwrap().push(call.clone());

    let b = &stub.behaviour;
    match (call.method.as_str(), call.path.as_str()) {
        ("POST", "/auth/v1/token") => {
            if call.query.contains("grant_type=password") && b.reject_password {
                return api_error(
                    StatusCode::BAD_REQUEST,
                    json!({"error": "invalid_grant", "error_description": "Invalid login credentials"}),
                );
            }
            if call.query.contains("grant_type=pkce") && b.fail_code_exchange {
                return api_error(
                    StatusCode::BAD_REQUEST,
                    json!({"code": 400, "error_code": "flow_state_not_found", "msg": "invalid flow state, no valid flow state found"}),
                );
            }
            Json(token_body(b.short_lived_tokens)).into_response()
        }
        ("POST", "/auth/v1/signup") => {
            if b.sign_up_returns_session {
                Json(token_body(b.short_lived_tokens)).into_response()
            } else {
                Json(user_body()).into_response()
            }
        }
        ("GET", "/auth/v1/user") => Json(user_body()).into_response(),
        ("POST", "/auth/v1/logout") => StatusCode::NO_CONTENT.into_response(),
        ("GET", "/rest/v1/Customer") => {
            if b.existing_customer {
                Json(json!([{"id": 42}])).into_response()
            } else {
                Json(json!([])).into_response()
            }
        }
        ("POST", "/rest/v1/Customer") => {
            let is_upsert = call.query.contains("on_conflict=username");
            if (is_upsert && b.fail_customer_upsert) || (!is_upsert && b.fail_customer_insert) {
                return api_error(
                    StatusCode::FORBIDDEN,
                    json!({"code": "42501", "message": "new row violates row-level security policy for table \"Customer\""}),
                );
            }
            StatusCode::CREATED.into_response()
        }
        ("POST", "/rest/v1/profiles") => {
            if b.fail_profile_upsert {
                return api_error(
                    StatusCode::BAD_REQUEST,
                    json!({"code": "23502", "message": "null value in column \"address\" violates not-null constraint"}),
                );
            }
            StatusCode::CREATED.into_response()
        }
        _ => api_error(StatusCode::NOT_FOUND, json!({"message": "no route"})),
    }
}

fn api_error(status: StatusCode, body: serde_json::Value) -> Response {
    (status, Json(body)).into_response()
}

fn user_body() -> serde_json::Value {
    json!({
        "id": STUB_USER_ID,
        "aud": "authenticated",
        "email": STUB_EMAIL,
        "app_metadata": {"provider": "email"}
    })
}

fn token_body(short_lived: bool) -> serde_json::Value {
    json!({
        "access_token": STUB_ACCESS_TOKEN,
        "token_type": "bearer",
        "expires_in": if short_lived { 0 } else { 3600 },
        "refresh_token": "stub-refresh-token",
        "user": user_body()
    })
}
