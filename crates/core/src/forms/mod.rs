//! Form inputs and their validation rules.
//!
//! Each form is deserialized straight from an `application/x-www-form-urlencoded`
//! body and validated into a typed value before anything talks to the
//! backend. Validation failures are collected per field so the page can show
//! every message next to its input.

mod errors;
pub mod login;
pub mod profile;
pub mod signup;

pub use errors::ValidationErrors;
pub use login::{LoginCredentials, LoginInput};
pub use profile::{GENDER_OPTIONS, ProfileDetails, ProfileInput};
pub use signup::{SignUpCredentials, SignUpInput};

use serde::{Deserialize, Deserializer};

use crate::Email;

/// Minimum password length accepted by both login and sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub(crate) const INVALID_EMAIL: &str = "Please enter a valid email address";
pub(crate) const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

/// Deserialize an HTML checkbox.
///
/// Browsers omit unchecked boxes entirely and send `on` (or the `value`
/// attribute) for checked ones.
pub(crate) fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        value.as_deref(),
        Some("on" | "true" | "1" | "yes")
    ))
}

/// Validate the email field, recording a message on failure.
pub(crate) fn check_email(raw: &str, errors: &mut ValidationErrors) -> Option<Email> {
    match Email::parse(raw.trim()) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.add("email", INVALID_EMAIL);
            None
        }
    }
}

/// Validate the password length, recording a message on failure.
pub(crate) fn check_password(raw: &str, errors: &mut ValidationErrors) {
    if raw.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add("password", PASSWORD_TOO_SHORT);
    }
}
