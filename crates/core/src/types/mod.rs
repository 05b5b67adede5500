//! Core types for the account portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod provider;

pub use email::{Email, EmailError};
pub use id::UserId;
pub use provider::{OAuthProvider, UnknownProvider};
