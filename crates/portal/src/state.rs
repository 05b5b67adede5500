//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::supabase::{SupabaseClient, SupabaseError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the backend client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PortalConfig,
    supabase: SupabaseClient,
    auth_callback_url: String,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built from the
    /// configured URL and key.
    pub fn new(config: PortalConfig) -> Result<Self, SupabaseError> {
        let supabase = SupabaseClient::new(&config.backend)?;
        let auth_callback_url = config.auth_callback_url();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                auth_callback_url,
            }),
        })
    }

    /// Get a reference to the portal configuration.
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Whether a real backend is configured (false means offline mode).
    #[must_use]
    pub fn backend_configured(&self) -> bool {
        self.inner.supabase.is_configured()
    }

    /// Absolute URL the backend redirects to after OAuth or email confirmation.
    #[must_use]
    pub fn auth_callback_url(&self) -> &str {
        &self.inner.auth_callback_url
    }
}
