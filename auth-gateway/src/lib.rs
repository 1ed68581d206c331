//! Authorization gate for the tenancy engine
//!
//! Every routed request is checked against the route's [`RouteMeta`] using
//! facts resolved beforehand: the transport ([`RequestFacts`]), the tenant
//! addressed by the host with its usage counters, and the signed-in person
//! with their effective roles. The gate is a pure function of those facts.
//!
//! Checks run in a fixed order and the first terminal outcome wins:
//!
//! 1. SSL: insecure safe requests are redirected to https, insecure writes are forbidden
//! 2. Tenant presence: missing tenant (or a tenant on a bare-domain route) is not found
//! 3. Inactive tenant: redirect to the inactive-account page unless allowed
//! 4. Login state: `requires_logout` with a person is forbidden, missing login redirects
//! 5. Resource limits: a denied resource redirects to the upgrade flow
//! 6. Anonymous requests that got this far are allowed
//! 7. Role expression decides between allow and forbidden
//!
//! The [`ResourceRegulator`] maps resource names to read-only predicates over
//! the tenant's usage snapshot and the tier's configured limit.
//!
//! # Example
//!
//! ```rust
//! use auth_gateway::{Gate, GateDecision, RequestFacts, ResourceRegulator, RouteMeta};
//! use config_engine::{PathSettings, SubscriptionCatalog};
//! use http::Method;
//! use std::sync::Arc;
//!
//! let gate = Gate::new(
//!     Arc::new(SubscriptionCatalog::default()),
//!     ResourceRegulator::new(),
//!     PathSettings::default(),
//! );
//! let facts = RequestFacts::new(Method::GET, false, "example.com", "/signup");
//!
//! let decision = gate.evaluate(&RouteMeta::signup(), &facts, None, None).unwrap();
//! assert_eq!(decision, GateDecision::Allow);
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod error;
pub mod facts;
pub mod gate;
pub mod meta;
pub mod middleware;
pub mod regulator;
pub mod usage;

pub use error::*;
pub use facts::*;
pub use gate::*;
pub use meta::*;
pub use middleware::{enforce, facts_from_parts, GateState, SessionPerson};
pub use regulator::*;
pub use usage::*;
