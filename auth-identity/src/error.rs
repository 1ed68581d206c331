use auth_roles::RoleExpressionError;
use error_common::PlatformError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Account not found")]
    AccountNotFound,

    #[error("Person not found")]
    PersonNotFound,

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password too weak")]
    WeakPassword,

    #[error("Hashing error")]
    HashingError,

    #[error("Role expression error: {0}")]
    RoleExpression(#[from] RoleExpressionError),

    #[error("Store error: {0}")]
    Store(#[from] PlatformError),
}

pub type Result<T> = std::result::Result<T, IdentityError>;
