//! Rows written to the backend's tables.
//!
//! Column names follow the tables as they exist in the backend. The legacy
//! `Customer` table uses camelCase columns (and `update_at`, not
//! `updated_at`); `profiles` uses snake_case.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use account_portal_core::{ProfileDetails, UserId};

/// Placeholder written to `Customer.password`; the real hash lives in the
/// backend's auth store.
pub const CUSTOMER_PASSWORD_PLACEHOLDER: &str = "hashed_in_supabase";

/// A row of the `profiles` table, upserted on `id`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileRow {
    pub id: UserId,
    pub email: Option<String>,
    pub phone_number: String,
    pub gender: String,
    pub address: String,
    pub date_of_birth: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    /// Build the row for `user_id` from validated form details.
    #[must_use]
    pub fn new(
        user_id: UserId,
        email: Option<String>,
        details: &ProfileDetails,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: user_id,
            email,
            phone_number: details.phone_number.clone(),
            gender: details.gender.clone(),
            address: details.address.clone(),
            date_of_birth: details.date_of_birth,
            updated_at: now,
        }
    }
}

/// Profile columns mirrored into the legacy `Customer` table, upserted on
/// `username`.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerProfileRow {
    pub username: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub gender: String,
    pub address: String,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: NaiveDate,
    pub update_at: DateTime<Utc>,
}

impl CustomerProfileRow {
    /// Build the legacy row for `username` from validated form details.
    #[must_use]
    pub fn new(username: &str, details: &ProfileDetails, now: DateTime<Utc>) -> Self {
        Self {
            username: username.to_string(),
            phone_number: details.phone_number.clone(),
            gender: details.gender.clone(),
            address: details.address.clone(),
            date_of_birth: details.date_of_birth,
            update_at: now,
        }
    }
}

/// A fresh `Customer` row inserted after sign-up.
#[derive(Debug, Clone, Serialize)]
pub struct NewCustomerRow {
    pub username: String,
    pub password: &'static str,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub points: i64,
}

impl NewCustomerRow {
    #[must_use]
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            password: CUSTOMER_PASSWORD_PLACEHOLDER,
            phone_number: String::new(),
            points: 0,
        }
    }
}
