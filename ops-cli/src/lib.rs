//! Operator tooling for the tenancy engine
//!
//! ```bash
//! saas-ops check-config platform.yaml
//! saas-ops roles "(billing|support)&staff" --role billing --role staff
//! saas-ops schedule --anchor 2007-03-19 --period 1 --cancelled-at 2007-09-23T00:00:00Z
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod cli;
pub mod commands;
pub mod output;

pub use cli::{Cli, Command};
pub use commands::*;
pub use output::OutputFormat;
