//! # Tasklist Shared Library
//!
//! This crate contains the authentication core used by the Tasklist API:
//! credential hashing, token issuance, and the configuration both depend on.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing and JWT tokens
//! - `config`: Process-wide authentication configuration
//! - `models`: User account records

pub mod auth;
pub mod config;
pub mod models;

/// Current version of the Tasklist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
