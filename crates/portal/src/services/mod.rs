//! Business logic services for the portal.
//!
//! # Services
//!
//! - `auth` - Password, social and email-confirmation sign-in, session
//!   upkeep and profile completion against the hosted backend

pub mod auth;
