//! Recurring billing for the tenancy engine
//!
//! - [`PaymentGateway`]: the three remote operations (`start`, `change`,
//!   `cancel`) with two failure classes, see [`GatewayError`]
//! - [`ArbGateway`]: Authorize.net ARB implementation over `reqwest` with a
//!   per-call deadline; replies are read with `quick-xml`
//! - [`RecurringPayment`]: the local ledger entry with its billing schedule
//!   and cancellation lifecycle
//! - [`BillingService`]: gateway calls paired with ledger updates
//!
//! # Lifecycle
//!
//! ```rust
//! use billing_service::{PaymentState, RecurringPayment};
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use rust_decimal::Decimal;
//! use uuid::Uuid;
//!
//! let anchor = NaiveDate::from_ymd_opt(2007, 3, 19).unwrap();
//! let mut payment = RecurringPayment {
//!     id: Uuid::new_v4(),
//!     account_id: Uuid::new_v4(),
//!     name: "Test Testerson".to_string(),
//!     number: "************1111".to_string(),
//!     amount: Decimal::new(100, 0),
//!     period: 1,
//!     token: "ref".to_string(),
//!     gateway_token: "100748".to_string(),
//!     active_on: anchor,
//!     cancelled_at: None,
//!     created_on: anchor,
//! };
//!
//! payment.deactivate(Utc.with_ymd_and_hms(2007, 9, 23, 0, 0, 0).unwrap());
//! let paid_through = Utc.with_ymd_and_hms(2007, 10, 19, 0, 0, 0).unwrap();
//! assert_eq!(payment.final_payment(), Some(paid_through));
//! assert_eq!(payment.state(paid_through), PaymentState::CancelledPendingExpiry);
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod arb;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod service;

pub use arb::{ArbGateway, ArbReply};
pub use error::*;
pub use gateway::*;
pub use models::*;
pub use repository::*;
pub use service::*;
