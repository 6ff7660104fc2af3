//! # Artcast Common Library
//!
//! Shared code for the Artcast content-approval services:
//! - Domain types (submissions, tenants, principals)
//! - Error taxonomy
//! - Session tokens and credential hashing

pub mod auth;
pub mod error;
pub mod types;

pub use error::{Error, Result};
