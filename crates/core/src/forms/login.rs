//! Login form.

use core::fmt;

use serde::Deserialize;

use super::{ValidationErrors, check_email, check_password, checkbox};
use crate::Email;

/// Raw login form submission.
#[derive(Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub remember_me: bool,
}

impl fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginInput")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

/// A login submission that passed validation.
#[derive(Clone)]
pub struct LoginCredentials {
    pub email: Email,
    pub password: String,
    pub remember_me: bool,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

impl LoginInput {
    /// Check the email syntax and the minimum password length.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<LoginCredentials, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let email = check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);

        match email {
            Some(email) if errors.is_empty() => Ok(LoginCredentials {
                email,
                password: self.password.clone(),
                remember_me: self.remember_me,
            }),
            _ => Err(errors),
        }
    }
}
