//! Authentication service.
//!
//! Wraps the backend client with the per-visitor session: every successful
//! sign-in stores an [`AuthSession`] server-side, guarded pages read it back
//! (refreshing when expired) and logout destroys it.
//!
//! When no backend is configured the service runs offline: logins, sign-ups,
//! social sign-ins and profile saves succeed after [`SIMULATED_DELAY`], and no
//! session is ever stored.

mod error;

pub use error::{ACCOUNT_EXISTS_MESSAGE, AuthError};

use std::time::Duration;

use chrono::Utc;
use tower_sessions::Session;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use account_portal_core::{LoginCredentials, OAuthProvider, ProfileDetails, SignUpCredentials};

use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::{AuthSession, CustomerProfileRow, NewCustomerRow, ProfileRow, session_keys};
use crate::pkce::PkceVerifier;
use crate::state::AppState;
use crate::supabase::{SignUpResult, SupabaseClient};

/// Pause applied to offline-mode actions so the UI behaves as if a request
/// were in flight.
pub const SIMULATED_DELAY: Duration = Duration::from_secs(1);

/// Identity shown on guarded pages when no backend is configured.
pub const OFFLINE_EMAIL: &str = "user@example.com";

/// Authentication service bound to one visitor's session.
pub struct AuthService<'a> {
    state: &'a AppState,
    session: &'a Session,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(state: &'a AppState, session: &'a Session) -> Self {
        Self { state, session }
    }

    /// Whether a real backend is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.state.backend_configured()
    }

    fn client(&self) -> &SupabaseClient {
        self.state.supabase()
    }

    // =========================================================================
    // Sign-in
    // =========================================================================

    /// Sign in with email and password and store the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Backend` if the backend rejects the credentials.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(), AuthError> {
        if !self.is_configured() {
            simulate_request().await;
            info!("Offline login accepted");
            return Ok(());
        }

        let auth = self
            .client()
            .sign_in_with_password(credentials.email.as_str(), &credentials.password)
            .await?;
        self.store_session(&auth).await?;

        info!(user_id = %auth.user.id, "User logged in");
        Ok(())
    }

    /// Register a new account.
    ///
    /// Checks the `Customer` table for an existing row first, then signs up
    /// with a PKCE challenge (verifier stored in the session beforehand) so the
    /// confirmation link can be exchanged at the callback. A `Customer` row is
    /// inserted afterwards on a best-effort basis. If the backend auto-confirms and returns a session, it is stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountExists` if a `Customer` row already uses the
    /// email, or `AuthError::Backend` if sign-up fails.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn sign_up(&self, credentials: &SignUpCredentials) -> Result<(), AuthError> {
        if !self.is_configured() {
            simulate_request().await;
            info!("Offline sign-up accepted");
            return Ok(());
        }

        let email = credentials.email.as_str();

        match self.client().find_customer_id(email).await {
            Ok(Some(_)) => return Err(AuthError::AccountExists),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Customer lookup failed, continuing with sign-up"),
        }

        let verifier = PkceVerifier::generate();
        self.session
            .insert(session_keys::PKCE_VERIFIER, &verifier)
            .await?;
        let result = self
            .client()
            .sign_up(
                email,
                &credentials.password,
                self.state.auth_callback_url(),
                &verifier.challenge(),
            )
            .await?;

        let bearer = match &result {
            SignUpResult::Session(auth) => Some(auth.access_token.as_str()),
            SignUpResult::PendingConfirmation(_) => None,
        };
        if let Err(e) = self
            .client()
            .insert_customer(&NewCustomerRow::new(email), bearer)
            .await
        {
            error!(error = %e, "Failed to insert Customer row after sign-up");
        }

        info!(user_id = %result.user().id, "User registered");

        if let SignUpResult::Session(auth) = result {
            self.store_session(&auth).await?;
        }
        Ok(())
    }

    /// Start a social sign-in.
    ///
    /// Returns the provider authorization URL to redirect the browser to, or
    /// `None` in offline mode (after the simulated delay).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built or the verifier cannot be
    /// stored.
    #[instrument(skip(self))]
    pub async fn oauth_redirect(&self, provider: OAuthProvider) -> Result<Option<Url>, AuthError> {
        if !self.is_configured() {
            simulate_request().await;
            info!("Offline social sign-in accepted");
            return Ok(None);
        }

        let verifier = PkceVerifier::generate();
        let url = self.client().authorize_url(
            provider,
            self.state.auth_callback_url(),
            &verifier.challenge(),
        )?;
        self.session
            .insert(session_keys::PKCE_VERIFIER, &verifier)
            .await?;

        add_breadcrumb("auth", "Started social sign-in", Some(&[("provider", provider.as_str())]));
        Ok(Some(url))
    }

    /// Exchange a callback code for a session and store it.
    ///
    /// The stored verifier is consumed whether or not the exchange succeeds.
    /// Offline, there is nothing to exchange and this does nothing.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingVerifier` if no verifier is stored, or
    /// `AuthError::Backend` if the exchange fails.
    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<(), AuthError> {
        if !self.is_configured() {
            debug!("Ignoring callback code in offline mode");
            return Ok(());
        }

        let verifier: PkceVerifier = self
            .session
            .remove(session_keys::PKCE_VERIFIER)
            .await?
            .ok_or(AuthError::MissingVerifier)?;

        let auth = self
            .client()
            .exchange_code_for_session(code, verifier.as_str())
            .await?;
        self.store_session(&auth).await?;

        info!(user_id = %auth.user.id, "Callback code exchanged for session");
        Ok(())
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Read the stored session, refreshing it if the access token expired.
    ///
    /// Always `None` in offline mode. A failed refresh drops the stored
    /// session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails or the refresh is rejected.
    pub async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        if !self.is_configured() {
            return Ok(None);
        }

        let Some(stored) = self
            .session
            .get::<AuthSession>(session_keys::AUTH_SESSION)
            .await?
        else {
            return Ok(None);
        };

        if !stored.is_expired(Utc::now().timestamp()) {
            return Ok(Some(stored));
        }

        match self.client().refresh_session(&stored.refresh_token).await {
            Ok(fresh) => {
                self.session
                    .insert(session_keys::AUTH_SESSION, &fresh)
                    .await?;
                debug!(user_id = %fresh.user.id, "Session refreshed");
                Ok(Some(fresh))
            }
            Err(e) => {
                warn!(error = %e, user_id = %stored.user.id, "Session refresh failed");
                self.session
                    .remove::<AuthSession>(session_keys::AUTH_SESSION)
                    .await?;
                Err(e.into())
            }
        }
    }

    async fn store_session(&self, auth: &AuthSession) -> Result<(), AuthError> {
        // New session ID on privilege change
        self.session.cycle_id().await?;
        self.session
            .insert(session_keys::AUTH_SESSION, auth)
            .await?;

        set_sentry_user(&auth.user.id, auth.user.email.as_deref());
        add_breadcrumb("auth", "Signed in", None);
        Ok(())
    }

    /// Sign out of the backend and destroy the local session.
    ///
    /// Never fails: backend and session store errors are logged.
    #[instrument(skip_all)]
    pub async fn logout(&self) {
        if self.is_configured() {
            match self
                .session
                .get::<AuthSession>(session_keys::AUTH_SESSION)
                .await
            {
                Ok(Some(auth)) => {
                    if let Err(e) = self.client().sign_out(&auth.access_token).await {
                        warn!(error = %e, "Backend sign-out failed");
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Failed to read session during logout"),
            }
        }

        if let Err(e) = self.session.flush().await {
            warn!(error = %e, "Failed to clear session during logout");
        }

        clear_sentry_user();
        add_breadcrumb("auth", "Signed out", None);
        info!("User logged out");
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Save the signed-in user's profile.
    ///
    /// `auth` is the session the page guard already loaded, so no second
    /// read or refresh happens here. Upserts the `profiles` row keyed by user ID, then mirrors the details
    /// into the legacy `Customer` row keyed by email on a best-effort basis.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` without a session, or
    /// `AuthError::Backend` if the user read or profile upsert fails.
    #[instrument(skip_all)]
    pub async fn save_profile(
        &self,
        auth: Option<&AuthSession>,
        details: &ProfileDetails,
    ) -> Result<(), AuthError> {
        if !self.is_configured() {
            simulate_request().await;
            info!("Offline profile save accepted");
            return Ok(());
        }

        let auth = auth.ok_or(AuthError::NotAuthenticated)?;
        let token = auth.access_token.as_str();

        let user = self.client().get_user(token).await?;
        let now = Utc::now();

        let row = ProfileRow::new(user.id, user.email.clone(), details, now);
        self.client().upsert_profile(&row, token).await?;

        let username = user.email.as_deref().unwrap_or_else(|| auth.email());
        if username.is_empty() {
            warn!(user_id = %user.id, "No email on account, skipping Customer profile update");
        } else if let Err(e) = self
            .client()
            .upsert_customer_profile(&CustomerProfileRow::new(username, details, now), token)
            .await
        {
            warn!(error = %e, "Failed to update Customer profile");
        }

        info!(user_id = %user.id, "Profile saved");
        Ok(())
    }
}

async fn simulate_request() {
    tokio::time::sleep(SIMULATED_DELAY).await;
}
