use auth_identity::IdentityError;
use auth_roles::RoleExpressionError;
use error_common::PlatformError;
use thiserror::Error;

/// Failure to reach a decision; never an authorization outcome
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Route declares a malformed role expression: {0}")]
    RoleExpression(#[from] RoleExpressionError),

    #[error("Identity resolution failed: {0}")]
    Identity(#[from] IdentityError),

    #[error("Store error: {0}")]
    Store(#[from] PlatformError),
}

pub type Result<T> = std::result::Result<T, GateError>;
