//! Outbound mail for the tenancy engine
//!
//! Three narrow collaborators used by the subscription workflows:
//!
//! - [`TemplateRenderer`]: Handlebars templates rendered to plain text, one
//!   subject and one body per template name
//! - [`EmailSender`]: delivery; [`InMemoryOutbox`] keeps messages for tests,
//!   [`TracingSender`] logs them
//! - [`OperatorNotifier`]: alerts for billing failures that need a human
//!
//! [`EmailService`] ties them together.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod error;
pub mod notifier;
pub mod sender;
pub mod service;
pub mod templates;

pub use error::*;
pub use notifier::*;
pub use sender::*;
pub use service::*;
pub use templates::*;
