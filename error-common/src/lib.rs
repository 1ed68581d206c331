//! Common error handling utilities for the tenancy engine
//!
//! This crate provides the error vocabulary shared by every storage and
//! collaborator seam in the workspace. Domain crates keep their own error
//! enums; what they have in common lives here.
//!
//! # Key Features
//!
//! - **PlatformError**: the failure type of every repository trait
//! - **Error Codes**: stable string codes attached to user feedback and alerts
//! - **Error Context**: key/value context carried into operator notifications
//!
//! # Example
//!
//! ```rust
//! use error_common::{PlatformError, ErrorContext, codes};
//!
//! fn reserve(subdomain: &str, taken: bool) -> error_common::Result<()> {
//!     if taken {
//!         return Err(PlatformError::conflict(format!("subdomain {subdomain} is taken")));
//!     }
//!     Ok(())
//! }
//!
//! let err = reserve("acme", true).unwrap_err();
//! assert_eq!(err.code(), codes::persistence::CONFLICT);
//!
//! let context = ErrorContext::new().add_context("subdomain", "acme");
//! assert_eq!(context.get("subdomain"), Some("acme"));
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod types;
pub mod context;
pub mod codes;

pub use types::*;
pub use context::*;
