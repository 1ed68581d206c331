//! Subscription sagas for the tenancy engine
//!
//! [`SubscriptionWorkflow`] runs every flow that changes what a tenant pays
//! for. All of them follow one shape:
//!
//! 1. validate local input, including uniqueness, before any gateway call
//! 2. make at most one gateway call per logical step, never retried
//! 3. a gateway Request error becomes [`Outcome::Invalid`] feedback and
//!    nothing unsaved is kept
//! 4. a gateway Response error (including timeouts) leaves prior state
//!    untouched, alerts the operators once and yields
//!    [`Outcome::ProcessingError`]
//! 5. on success the new record is stored before the superseded one is
//!    deleted, so a tenant that had a valid payment method always has one
//!
//! Payment-mutating flows hold a per-tenant async mutex for their whole
//! duration.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod account;
pub mod error;
pub mod locks;
pub mod outcome;
pub mod payment_method;
pub mod signup;
pub mod upgrade;
pub mod workflow;

pub use error::*;
pub use locks::{TenantGuard, TenantLocks};
pub use outcome::*;
pub use signup::{SignupReceipt, SignupRequest};
pub use workflow::SubscriptionWorkflow;
