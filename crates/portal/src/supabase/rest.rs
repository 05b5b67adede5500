//! PostgREST table endpoints.

use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{SupabaseClient, SupabaseError};
use crate::models::{CustomerProfileRow, NewCustomerRow, ProfileRow};

const CUSTOMER_TABLE: &str = "Customer";
const PROFILES_TABLE: &str = "profiles";

const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_MERGE: &str = "resolution=merge-duplicates,return=minimal";

#[derive(Deserialize)]
struct IdRow {
    id: serde_json::Value,
}

impl SupabaseClient {
    /// Look up the `Customer` row whose `username` equals `username`.
    ///
    /// Returns the row's `id` if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub async fn find_customer_id(
        &self,
        username: &str,
    ) -> Result<Option<serde_json::Value>, SupabaseError> {
        let url = self.table_endpoint(CUSTOMER_TABLE)?;
        let filter = format!("eq.{username}");
        let request = self
            .http()
            .get(url)
            .query(&[("select", "id"), ("username", filter.as_str()), ("limit", "1")])
            .bearer_auth(self.anon_bearer());

        let rows: Vec<IdRow> = self.send_json(request).await?;
        Ok(rows.into_iter().next().map(|row| row.id))
    }

    /// Insert a fresh `Customer` row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert is rejected.
    #[instrument(skip(self, bearer), fields(username = %row.username))]
    pub async fn insert_customer(
        &self,
        row: &NewCustomerRow,
        bearer: Option<&str>,
    ) -> Result<(), SupabaseError> {
        let request = self.write(CUSTOMER_TABLE, None, PREFER_MINIMAL, row, bearer)?;
        self.send_empty(request).await
    }

    /// Insert or update the caller's `profiles` row, keyed by `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert is rejected.
    #[instrument(skip(self, row, bearer), fields(user_id = %row.id))]
    pub async fn upsert_profile(&self, row: &ProfileRow, bearer: &str) -> Result<(), SupabaseError> {
        let request = self.write(PROFILES_TABLE, Some("id"), PREFER_MERGE, row, Some(bearer))?;
        self.send_empty(request).await
    }

    /// Insert or update the legacy `Customer` profile columns, keyed by
    /// `username`.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert is rejected.
    #[instrument(skip(self, row, bearer), fields(username = %row.username))]
    pub async fn upsert_customer_profile(
        &self,
        row: &CustomerProfileRow,
        bearer: &str,
    ) -> Result<(), SupabaseError> {
        let request = self.write(
            CUSTOMER_TABLE,
            Some("username"),
            PREFER_MERGE,
            row,
            Some(bearer),
        )?;
        self.send_empty(request).await
    }

    fn table_endpoint(&self, table: &str) -> Result<url::Url, SupabaseError> {
        self.endpoint(&format!("rest/v1/{table}"))
    }

    /// Build a `POST` to `table`, as the signed-in user when `bearer` is given.
    fn write<T: Serialize>(
        &self,
        table: &str,
        on_conflict: Option<&str>,
        prefer: &str,
        row: &T,
        bearer: Option<&str>,
    ) -> Result<RequestBuilder, SupabaseError> {
        let mut url = self.table_endpoint(table)?;
        if let Some(column) = on_conflict {
            url.query_pairs_mut().append_pair("on_conflict", column);
        }

        Ok(self
            .http()
            .post(url)
            .header("Prefer", prefer)
            .bearer_auth(bearer.unwrap_or_else(|| self.anon_bearer()))
            .json(row))
    }
}
