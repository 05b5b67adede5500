//! Domain models for the portal.
//!
//! - [`session`] holds the authenticated session kept server-side between
//!   requests.
//! - [`profile`] holds the rows written to the backend tables on sign-up and
//!   profile completion.

pub mod profile;
pub mod session;

pub use profile::{CustomerProfileRow, NewCustomerRow, ProfileRow};
pub use session::{AuthSession, SessionUser, keys as session_keys};
