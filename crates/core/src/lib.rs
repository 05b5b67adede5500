//! Account Portal Core - Shared types library.
//!
//! This crate provides the domain types used by the `account-portal` web
//! application and its integration tests.
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no HTTP
//! clients. Everything here can be exercised with plain unit tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for emails, user ids and identity providers
//! - [`forms`] - Login, sign-up and profile form inputs with their validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod forms;
pub mod types;

pub use forms::*;
pub use types::*;
