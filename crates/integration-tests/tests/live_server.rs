//! Smoke tests against a running portal.
//!
//! Requires a running server. Set `PORTAL_BASE_URL` (defaults to
//! `http://localhost:3000`) and run with `--ignored`.

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode, redirect::Policy};

fn base_url() -> String {
    std::env::var("PORTAL_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_live_health() {
    let response = client()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_live_login_page() {
    let response = client().get(base_url()).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("content-security-policy"));
    assert!(response.text().await.unwrap().contains("Welcome Back"));
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_live_unknown_path_redirects() {
    let response = client()
        .get(format!("{}/does-not-exist", base_url()))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/");
}

#[tokio::test]
#[ignore = "Requires running portal server"]
async fn test_live_dashboard_requires_session_when_backend_configured() {
    let response = client()
        .get(format!("{}/dashboard", base_url()))
        .send()
        .await
        .unwrap();

    // Offline servers show the placeholder identity instead
    assert!(matches!(
        response.status(),
        StatusCode::OK | StatusCode::SEE_OTHER
    ));
}
