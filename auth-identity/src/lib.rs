//! Tenants and identities for the tenancy engine
//!
//! This crate provides:
//! - Accounts (tenants addressed by `subdomain.domain`)
//! - People, groups and the global role vocabulary
//! - Argon2 password hashing, authentication and password resets
//! - Effective-role computation and role-expression checks
//! - Repository traits with in-memory implementations
//!
//! # Example
//!
//! ```rust
//! use auth_identity::parse_host;
//!
//! assert_eq!(
//!     parse_host("acme.example.com:8443"),
//!     Some(("acme".to_string(), "example.com".to_string()))
//! );
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;

pub use config::*;
pub use error::*;
pub use models::*;
pub use service::*;
