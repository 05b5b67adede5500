//! GoTrue auth endpoints.

use account_portal_core::OAuthProvider;
use chrono::Utc;
use tracing::instrument;
use url::Url;

use super::types::{
    PasswordGrant, PkceGrant, RefreshGrant, SignUpRequest, SignUpResponse, SignUpResult,
    TokenResponse,
};
use super::{SupabaseClient, SupabaseError};
use crate::models::{AuthSession, SessionUser};

/// PKCE challenge method; the backend only accepts SHA-256.
const CODE_CHALLENGE_METHOD: &str = "s256";

impl SupabaseClient {
    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the backend's message for bad credentials, unconfirmed email and
    /// similar failures.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let url = self.token_endpoint("password")?;
        let request = self
            .http()
            .post(url)
            .json(&PasswordGrant { email, password });

        let response: TokenResponse = self.send_json(request).await?;
        Ok(response.into_session(Utc::now().timestamp()))
    }

    /// Register a new account.
    ///
    /// `redirect_to` is where the confirmation email sends the user;
    /// `code_challenge` ties that confirmation to a verifier held by the caller.
    ///
    /// # Errors
    ///
    /// Returns the backend's message, e.g. when the user already exists.
    #[instrument(skip(self, password, code_challenge))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<SignUpResult, SupabaseError> {
        let mut url = self.endpoint("auth/v1/signup")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        let request = self.http().post(url).json(&SignUpRequest {
            email,
            password,
            code_challenge,
            code_challenge_method: CODE_CHALLENGE_METHOD,
        });

        let response: SignUpResponse = self.send_json(request).await?;
        Ok(match response {
            SignUpResponse::Session(tokens) => {
                SignUpResult::Session(tokens.into_session(Utc::now().timestamp()))
            }
            SignUpResponse::User(user) => SignUpResult::PendingConfirmation(user),
        })
    }

    /// Build the provider authorization URL the browser is redirected to.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built.
    pub fn authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<Url, SupabaseError> {
        let mut url = self.endpoint("auth/v1/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", CODE_CHALLENGE_METHOD);
        Ok(url)
    }

    /// Exchange an OAuth or email-confirmation code for a session.
    ///
    /// # Errors
    ///
    /// Returns the backend's message for expired or mismatched codes.
    #[instrument(skip_all)]
    pub async fn exchange_code_for_session(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let url = self.token_endpoint("pkce")?;
        let request = self.http().post(url).json(&PkceGrant {
            auth_code,
            code_verifier,
        });

        let response: TokenResponse = self.send_json(request).await?;
        Ok(response.into_session(Utc::now().timestamp()))
    }

    /// Obtain a fresh session from a refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token was revoked or already used.
    #[instrument(skip_all)]
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, SupabaseError> {
        let url = self.token_endpoint("refresh_token")?;
        let request = self
            .http()
            .post(url)
            .json(&RefreshGrant { refresh_token });

        let response: TokenResponse = self.send_json(request).await?;
        Ok(response.into_session(Utc::now().timestamp()))
    }

    /// Fetch the user an access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or expired.
    #[instrument(skip_all)]
    pub async fn get_user(&self, access_token: &str) -> Result<SessionUser, SupabaseError> {
        let url = self.endpoint("auth/v1/user")?;
        let request = self.http().get(url).bearer_auth(access_token);
        self.send_json(request).await
    }

    /// Revoke the session an access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the call.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let url = self.endpoint("auth/v1/logout")?;
        let request = self.http().post(url).bearer_auth(access_token);
        self.send_empty(request).await
    }

    fn token_endpoint(&self, grant_type: &str) -> Result<Url, SupabaseError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        Ok(url)
    }
}
