//! Third-party identity providers offered for social sign-in.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a provider identifier is not one we offer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported identity provider: {0}")]
pub struct UnknownProvider(pub String);

/// An identity provider the social-login buttons can start a redirect for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Facebook,
}

impl OAuthProvider {
    /// Every provider, in the order the buttons are rendered.
    pub const ALL: [Self; 2] = [Self::Google, Self::Facebook];

    /// Identifier understood by the backend's `authorize` endpoint.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }

    /// Human-readable button label.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Facebook => "Facebook",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_known() {
        assert_eq!("google".parse(), Ok(OAuthProvider::Google));
        assert_eq!("facebook".parse(), Ok(OAuthProvider::Facebook));
    }

    #[test]
    fn test_from_str_unknown() {
        assert_eq!(
            "github".parse::<OAuthProvider>(),
            Err(UnknownProvider("github".to_string()))
        );
        // identifiers are case-sensitive, like the backend's
        assert!("Google".parse::<OAuthProvider>().is_err());
    }
}
