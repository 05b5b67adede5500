//! Client for the hosted authentication-and-database backend.
//!
//! The backend is a Supabase-style deployment: GoTrue auth endpoints under
//! `/auth/v1` and PostgREST table endpoints under `/rest/v1`. One
//! [`SupabaseClient`] is built at startup and shared through `AppState`.
//!
//! # Offline mode
//!
//! When the URL or key is missing the client is still constructed, pointed at
//! a placeholder project, and [`SupabaseClient::is_configured`] reports
//! `false`. Callers check that flag and take their offline branches instead of
//! calling the backend.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = SupabaseClient::new(&config.backend)?;
//!
//! if client.is_configured() {
//!     let session = client.sign_in_with_password("a@b.com", "secret1").await?;
//!     let user = client.get_user(&session.access_token).await?;
//! }
//! ```

mod auth;
mod rest;
mod types;

pub use types::SignUpResult;

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::BackendConfig;

/// Project URL used when none is configured.
pub const PLACEHOLDER_URL: &str = "https://placeholder-project.supabase.co";

/// API key used when none is configured.
pub const PLACEHOLDER_KEY: &str = "placeholder-key";

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body could not be understood.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SupabaseError {
    /// Text suitable for showing inline on a form.
    ///
    /// Backend-reported errors are shown verbatim; transport and parsing
    /// failures get a generic sentence.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Http(_) => {
                "Unable to reach the authentication service. Please try again.".to_string()
            }
            Self::Parse(_) | Self::InvalidUrl(_) => {
                "Unexpected response from the authentication service.".to_string()
            }
        }
    }

    /// HTTP status returned by the backend, if it answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Client for the hosted backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
    configured: bool,
}

impl SupabaseClient {
    /// Create the client from backend configuration.
    ///
    /// Missing values fall back to [`PLACEHOLDER_URL`] and [`PLACEHOLDER_KEY`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or key cannot be used in a request, or the
    /// HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, SupabaseError> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(PLACEHOLDER_URL);
        let anon_key = config
            .anon_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|k| !k.is_empty())
            .unwrap_or(PLACEHOLDER_KEY);

        let mut base_url = Url::parse(url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut api_key = HeaderValue::from_str(anon_key)
            .map_err(|e| SupabaseError::Parse(format!("Invalid API key format: {e}")))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("account-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                base_url,
                anon_key: SecretString::from(anon_key),
                configured: config.is_configured(),
            }),
        })
    }

    /// Whether real (non-placeholder) configuration was supplied.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.configured
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, SupabaseError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Bearer token for calls made without a signed-in user.
    fn anon_bearer(&self) -> &str {
        self.inner.anon_key.expose_secret()
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, SupabaseError> {
        let response = check_status(request.send().await?).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SupabaseError::Parse(e.to_string()))
    }

    /// Send a request whose body, if any, is ignored.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), SupabaseError> {
        check_status(request.send().await?).await?;
        Ok(())
    }
}

/// Turn a non-success response into [`SupabaseError::Api`].
async fn check_status(response: Response) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

/// Build an API error from a response body.
///
/// GoTrue reports failures as `error_description`, `msg` or `error`;
/// PostgREST uses `message`. The first string field found wins, then the raw
/// body, then the status reason.
fn api_error(status: StatusCode, body: &str) -> SupabaseError {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(String::from))
        });

    let message = from_json
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });

    SupabaseError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message_of(status: u16, body: &str) -> String {
        api_error(StatusCode::from_u16(status).unwrap(), body).message()
    }

    #[test]
    fn test_api_error_prefers_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(message_of(400, body), "Invalid login credentials");
    }

    #[test]
    fn test_api_error_gotrue_msg() {
        let body = r#"{"code":422,"error_code":"user_already_exists","msg":"User already registered"}"#;
        assert_eq!(message_of(422, body), "User already registered");
    }

    #[test]
    fn test_api_error_postgrest_message() {
        let body = r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"public.Customer\" does not exist"}"#;
        assert_eq!(
            message_of(404, body),
            "relation \"public.Customer\" does not exist"
        );
    }

    #[test]
    fn test_api_error_plain_text_and_empty() {
        assert_eq!(message_of(502, "upstream timeout"), "upstream timeout");
        assert_eq!(message_of(503, ""), "Service Unavailable");
    }

    #[test]
    fn test_api_error_status() {
        assert_eq!(api_error(StatusCode::BAD_REQUEST, "").status(), Some(400));
    }

    #[test]
    fn test_unconfigured_client_uses_placeholders() {
        let client = SupabaseClient::new(&BackendConfig::default()).unwrap();
        assert!(!client.is_configured());
        assert_eq!(
            client.base_url().as_str(),
            "https://placeholder-project.supabase.co/"
        );
    }

    #[test]
    fn test_configured_client_endpoints() {
        let config = BackendConfig {
            url: Some("https://abcd.supabase.co".to_string()),
            anon_key: Some(SecretString::from("anon")),
        };
        let client = SupabaseClient::new(&config).unwrap();
        assert!(client.is_configured());
        assert_eq!(
            client.endpoint("auth/v1/token").unwrap().as_str(),
            "https://abcd.supabase.co/auth/v1/token"
        );
    }
}
