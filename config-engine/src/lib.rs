//! Platform configuration for the tenancy engine
//!
//! This crate provides:
//! - Layered loading (built-in defaults, YAML file, `SAAS_` environment)
//! - The ordered subscription-level catalogue and resource limits
//! - Redirect paths used by the authorization gate
//! - Gateway and operator-mail settings
//!
//! # Example
//!
//! ```rust
//! use config_engine::{ResourceLimit, SubscriptionCatalog, SubscriptionLevel};
//! use rust_decimal::Decimal;
//!
//! let gold = SubscriptionLevel {
//!     handle: "gold".into(),
//!     name: "Gold Membership".into(),
//!     description: String::new(),
//!     price: Decimal::new(20000, 2),
//!     period: 1,
//!     trial_periods: 1,
//!     resources: [("projects".to_string(), ResourceLimit::Unlimited)].into(),
//! };
//! let catalog = SubscriptionCatalog::new(vec![gold]);
//!
//! assert!(catalog.validate().is_ok());
//! assert!(catalog.has_level_or_greater(0, "gold").unwrap());
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod error;
pub mod settings;
pub mod subscription;

pub use error::*;
pub use settings::*;
pub use subscription::*;
