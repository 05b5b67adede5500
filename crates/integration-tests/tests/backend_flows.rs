//! Portal behaviour against a stub backend.

#![allow(clippy::unwrap_used)]

use account_portal_integration_tests::{
    STUB_ACCESS_TOKEN, STUB_EMAIL, StubBackend, StubBehaviour, TestApp,
};
use axum::http::StatusCode;

const TOKEN: &str = "POST /auth/v1/token";
const SIGNUP: &str = "POST /auth/v1/signup";
const LOGOUT: &str = "POST /auth/v1/logout";
const CUSTOMER_LOOKUP: &str = "GET /rest/v1/Customer";
const CUSTOMER_WRITE: &str = "POST /rest/v1/Customer";
const PROFILES: &str = "POST /rest/v1/profiles";

const SIGN_UP_FORM: [(&str, &str); 4] = [
    ("email", STUB_EMAIL),
    ("password", "secret1"),
    ("confirm_password", "secret1"),
    ("accept_terms", "on"),
];

const PROFILE_FORM: [(&str, &str); 4] = [
    ("phone_number", "+1 555 123 4567"),
    ("gender", "female"),
    ("address", "123 Main St"),
    ("date_of_birth", "1990-05-17"),
];

async fn signed_in(backend: &StubBackend) -> TestApp {
    let mut app = TestApp::with_backend(backend);
    app.post_form("/auth/login", &[("email", STUB_EMAIL), ("password", "secret1")])
        .await
        .assert_redirect("/profile-completion");
    app
}

#[tokio::test]
async fn test_guarded_pages_redirect_without_session() {
    let backend = StubBackend::start().await;
    let mut app = TestApp::with_backend(&backend);

    app.get("/dashboard").await.assert_redirect("/");
    app.get("/profile-completion").await.assert_redirect("/");
    app.post_form("/profile-completion", &PROFILE_FORM)
        .await
        .assert_redirect("/");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_validation_failure_makes_no_backend_calls() {
    let backend = StubBackend::start().await;
    let mut app = TestApp::with_backend(&backend);

    let response = app
        .post_form("/auth/login", &[("email", "nope"), ("password", "1")])
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .post_form("/auth/signup", &[("email", STUB_EMAIL), ("password", "secret1")])
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_login_rejected_shows_backend_message() {
    let backend = StubBackend::start_with(StubBehaviour {
        reject_password: true,
        ..Default::default()
    })
    .await;
    let mut app = TestApp::with_backend(&backend);

    let response = app
        .post_form("/auth/login", &[("email", STUB_EMAIL), ("password", "wrong-password")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Invalid login credentials"));
    assert!(response.body.contains(&format!("value=\"{STUB_EMAIL}\"")));

    let calls = backend.calls_to(TOKEN);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].query.contains("grant_type=password"));

    app.get("/dashboard").await.assert_redirect("/");
}

#[tokio::test]
async fn test_login_dashboard_logout() {
    let backend = StubBackend::start().await;
    let mut app = signed_in(&backend).await;

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains(STUB_EMAIL));

    app.post_form("/auth/logout", &[]).await.assert_redirect("/");

    let logout = backend.calls_to(LOGOUT);
    assert_eq!(logout.len(), 1);
    assert_eq!(
        logout[0].authorization.as_deref(),
        Some(format!("Bearer {STUB_ACCESS_TOKEN}").as_str())
    );

    app.get("/dashboard").await.assert_redirect("/");
}

#[tokio::test]
async fn test_expired_session_is_refreshed() {
    let backend = StubBackend::start_with(StubBehaviour {
        short_lived_tokens: true,
        ..Default::default()
    })
    .await;
    let mut app = signed_in(&backend).await;

    let dashboard = app.get("/dashboard").await;
    assert_eq!(dashboard.status, StatusCode::OK);

    let refreshes: Vec<_> = backend
        .calls_to(TOKEN)
        .into_iter()
        .filter(|call| call.query.contains("grant_type=refresh_token"))
        .collect();
    assert!(!refreshes.is_empty());
    assert!(refreshes[0].body.contains("stub-refresh-token"));
}

#[tokio::test]
async fn test_signup_with_existing_customer_is_rejected() {
    let backend = StubBackend::start_with(StubBehaviour {
        existing_customer: true,
        ..Default::default()
    })
    .await;
    let mut app = TestApp::with_backend(&backend);

    let response = app.post_form("/auth/signup", &SIGN_UP_FORM).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Email already in use"));

    let lookups = backend.calls_to(CUSTOMER_LOOKUP);
    assert_eq!(lookups.len(), 1);
    assert!(lookups[0].query.contains("username=eq.a%40b.com"));
    assert!(backend.calls_to(SIGNUP).is_empty());
}

#[tokio::test]
async fn test_signup_sends_challenge_and_tolerates_customer_insert_failure() {
    let backend = StubBackend::start_with(StubBehaviour {
        fail_customer_insert: true,
        ..Default::default()
    })
    .await;
    let mut app = TestApp::with_backend(&backend);

    app.post_form("/auth/signup", &SIGN_UP_FORM)
        .await
        .assert_redirect("/?success=registered");

    let signups = backend.calls_to(SIGNUP);
    assert_eq!(signups.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&signups[0].body).unwrap();
    assert_eq!(body["email"], STUB_EMAIL);
    assert_eq!(body["code_challenge_method"], "s256");
    assert_eq!(body["code_challenge"].as_str().unwrap().len(), 43);
    assert!(signups[0].query.contains("redirect_to="));

    let inserts = backend.calls_to(CUSTOMER_WRITE);
    assert_eq!(inserts.len(), 1);
    let row: serde_json::Value = serde_json::from_str(&inserts[0].body).unwrap();
    assert_eq!(row["username"], STUB_EMAIL);
    assert_eq!(row["points"], 0);
}

#[tokio::test]
async fn test_signup_with_session_signs_in() {
    let backend = StubBackend::start_with(StubBehaviour {
        sign_up_returns_session: true,
        ..Default::default()
    })
    .await;
    let mut app = TestApp::with_backend(&backend);

    app.post_form("/auth/signup", &SIGN_UP_FORM)
        .await
        .assert_redirect("/?success=registered");

    assert_eq!(app.get("/dashboard").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_profile_save_writes_both_tables() {
    let backend = StubBackend::start().await;
    let mut app = signed_in(&backend).await;

    app.post_form("/profile-completion", &PROFILE_FORM)
        .await
        .assert_redirect("/dashboard");

    let profiles = backend.calls_to(PROFILES);
    assert_eq!(profiles.len(), 1);
    assert!(profiles[0].query.contains("on_conflict=id"));
    let row: serde_json::Value = serde_json::from_str(&profiles[0].body).unwrap();
    assert_eq!(row["phone_number"], "+1 555 123 4567");
    assert_eq!(row["date_of_birth"], "1990-05-17");

    let customers: Vec<_> = backend
        .calls_to(CUSTOMER_WRITE)
        .into_iter()
        .filter(|call| call.query.contains("on_conflict=username"))
        .collect();
    assert_eq!(customers.len(), 1);
    let row: serde_json::Value = serde_json::from_str(&customers[0].body).unwrap();
    assert_eq!(row["phoneNumber"], "+1 555 123 4567");
}

#[tokio::test]
async fn test_profile_save_tolerates_customer_upsert_failure() {
    let backend = StubBackend::start_with(StubBehaviour {
        fail_customer_upsert: true,
        ..Default::default()
    })
    .await;
    let mut app = signed_in(&backend).await;

    app.post_form("/profile-completion", &PROFILE_FORM)
        .await
        .assert_redirect("/dashboard");
}

#[tokio::test]
async fn test_profile_upsert_failure_is_shown() {
    let backend = StubBackend::start_with(StubBehaviour {
        fail_profile_upsert: true,
        ..Default::default()
    })
    .await;
    let mut app = signed_in(&backend).await;

    let response = app.post_form("/profile-completion", &PROFILE_FORM).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("violates not-null constraint"));
    assert!(response.body.contains(">123 Main St</textarea>"));
}

#[tokio::test]
async fn test_oauth_redirect_and_callback_exchange() {
    let backend = StubBackend::start().await;
    let mut app = TestApp::with_backend(&backend);

    let response = app
        .post_form("/auth/oauth/google", &[("origin", "login")])
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let location = response.location().unwrap();
    assert!(location.starts_with(&format!("{}/auth/v1/authorize?", backend.url)));
    assert!(location.contains("provider=google"));
    assert!(location.contains("code_challenge="));
    assert!(location.contains("redirect_to=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"));

    app.get("/auth/callback?code=abc")
        .await
        .assert_redirect("/profile-completion");

    let exchanges: Vec<_> = backend
        .calls_to(TOKEN)
        .into_iter()
        .filter(|call| call.query.contains("grant_type=pkce"))
        .collect();
    assert_eq!(exchanges.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&exchanges[0].body).unwrap();
    assert_eq!(body["auth_code"], "abc");
    assert_eq!(body["code_verifier"].as_str().unwrap().len(), 64);

    assert_eq!(app.get("/dashboard").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_callback_without_verifier_shows_error() {
    let backend = StubBackend::start().await;
    let mut app = TestApp::with_backend(&backend);

    let response = app.get("/auth/callback?code=abc").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Authentication Error"));
    assert!(response.body.contains("expired"));
    assert!(backend.calls_to(TOKEN).is_empty());
}

#[tokio::test]
async fn test_callback_exchange_failure_shows_error() {
    let backend = StubBackend::start_with(StubBehaviour {
        fail_code_exchange: true,
        ..Default::default()
    })
    .await;
    let mut app = TestApp::with_backend(&backend);

    app.post_form("/auth/oauth/facebook", &[("origin", "signup")]).await;
    let response = app.get("/auth/callback?code=abc").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("invalid flow state"));
    app.get("/dashboard").await.assert_redirect("/");
}

#[tokio::test]
async fn test_callback_without_code_or_session_returns_to_login() {
    let backend = StubBackend::start().await;
    let mut app = TestApp::with_backend(&backend);
    app.get("/auth/callback").await.assert_redirect("/");
}

#[tokio::test]
async fn test_remember_me_with_backend_login() {
    let backend = StubBackend::start().await;
    let mut app = TestApp::with_backend(&backend);

    let response = app
        .post_form(
            "/auth/login",
            &[("email", STUB_EMAIL), ("password", "secret1"), ("remember_me", "on")],
        )
        .await;
    response.assert_redirect("/profile-completion");

    let cookie = response.set_cookie("remembered_email").unwrap();
    assert!(cookie.starts_with("remembered_email=a%40b.com"));
    assert_eq!(app.cookie("remembered_email"), Some(STUB_EMAIL));

    let page = app.get("/").await;
    assert!(page.body.contains(&format!("value=\"{STUB_EMAIL}\"")));

    let response = app
        .post_form("/auth/login", &[("email", STUB_EMAIL), ("password", "secret1")])
        .await;
    assert!(response.set_cookie("remembered_email").unwrap().contains("Max-Age=0"));
    assert_eq!(app.cookie("remembered_email"), None);
}

#[tokio::test]
async fn test_profile_save_reuses_guard_session() {
    let backend = StubBackend::start_with(StubBehaviour {
        short_lived_tokens: true,
        ..Default::default()
    })
    .await;
    let mut app = signed_in(&backend).await;
    let refreshes = |backend: &StubBackend| {
        backend
            .calls_to(TOKEN)
            .into_iter()
            .filter(|call| call.query.contains("grant_type=refresh_token"))
            .count()
    };

    let before = refreshes(&backend);
    app.post_form("/profile-completion", &PROFILE_FORM)
        .await
        .assert_redirect("/dashboard");

    assert_eq!(refreshes(&backend), before + 1);
    assert_eq!(backend.calls_to(PROFILES).len(), 1);
}

#[tokio::test]
async fn test_signup_confirmation_link_exchanges_stored_verifier() {
    let backend = StubBackend::start().await;
    let mut app = TestApp::with_backend(&backend);

    app.post_form("/auth/signup", &SIGN_UP_FORM)
        .await
        .assert_redirect("/?success=registered");
    app.get("/auth/callback?code=confirm-123")
        .await
        .assert_redirect("/profile-completion");

    let exchanges: Vec<_> = backend
        .calls_to(TOKEN)
        .into_iter()
        .filter(|call| call.query.contains("grant_type=pkce"))
        .collect();
    assert_eq!(exchanges.len(), 1);
    let body: serde_json::Value = serde_json::from_str(&exchanges[0].body).unwrap();
    assert_eq!(body["auth_code"], "confirm-123");
    assert_eq!(body["code_verifier"].as_str().unwrap().len(), 64);
}
