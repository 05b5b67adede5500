//! Sign-up form.

use core::fmt;

use serde::Deserialize;

use super::{ValidationErrors, check_email, check_password, checkbox};
use crate::Email;

const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
const TERMS_NOT_ACCEPTED: &str = "You must accept the terms and conditions";

/// Raw sign-up form submission.
#[derive(Clone, Default, Deserialize)]
pub struct SignUpInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub accept_terms: bool,
}

impl fmt::Debug for SignUpInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpInput")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("confirm_password", &"[REDACTED]")
            .field("accept_terms", &self.accept_terms)
            .finish()
    }
}

/// A sign-up submission that passed validation.
#[derive(Clone)]
pub struct SignUpCredentials {
    pub email: Email,
    pub password: String,
}

impl fmt::Debug for SignUpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SignUpInput {
    /// Check email syntax, password length, confirmation and terms acceptance.
    ///
    /// A mismatched confirmation is reported on `confirm_password`.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<SignUpCredentials, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);

        if self.password != self.confirm_password {
            errors.add("confirm_password", PASSWORDS_DO_NOT_MATCH);
        }
        if !self.accept_terms {
            errors.add("accept_terms", TERMS_NOT_ACCEPTED);
        }

        match email {
            Some(email) if errors.is_empty() => Ok(SignUpCredentials {
                email,
                password: self.password.clone(),
            }),
            _ => Err(errors),
        }
    }
}
