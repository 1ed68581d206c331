use auth_identity::IdentityError;
use email_service::EmailError;
use error_common::PlatformError;
use thiserror::Error;

/// Failures a workflow cannot turn into an [`Outcome`](crate::Outcome)
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Store error: {0}")]
    Store(#[from] PlatformError),

    #[error("Email error: {0}")]
    Email(#[from] EmailError),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
