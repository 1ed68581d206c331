//! Tracing setup for the tenancy engine
//!
//! [`init`] installs a `tracing_subscriber` registry with an [`EnvFilter`]
//! and either a pretty or a JSON fmt layer. `RUST_LOG` wins over the
//! configured level.
//!
//! Payment traffic carries card numbers and merchant credentials, so any raw
//! gateway payload is passed through [`PiiRedactor`] before it is logged:
//!
//! ```rust
//! use logger_redacted::PiiRedactor;
//!
//! let redactor = PiiRedactor::default();
//! let line = redactor.redact("<cardNumber>4111111111111111</cardNumber>");
//! assert_eq!(line, "<cardNumber>************1111</cardNumber>");
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber
///
/// # Errors
///
/// Fails when the configured level is not a valid filter directive or a
/// subscriber was installed before.
pub fn init(config: &LoggerConfig) -> Result<(), LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init()?,
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()?,
    }

    tracing::debug!(
        level = %config.level,
        redaction = config.redaction.enabled,
        "logging initialised"
    );
    Ok(())
}
