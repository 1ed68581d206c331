use crate::codes;
use thiserror::Error;

/// Failure shared by every persistence and collaborator seam
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Record lookup found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness constraint would be violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage backend failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Wrapped external errors
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PlatformError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    pub fn persistence(what: impl Into<String>) -> Self {
        Self::Persistence(what.into())
    }

    /// Stable code for logs and feedback
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => codes::persistence::NOT_FOUND,
            Self::Conflict(_) => codes::persistence::CONFLICT,
            Self::Persistence(_) => codes::persistence::FAILURE,
            Self::Configuration(_) => codes::configuration::INVALID,
            Self::Internal(_) => codes::internal::UNEXPECTED,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Result type alias for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Log a platform error with its code attached
pub fn log_error(context: &str, error: &PlatformError) {
    tracing::error!(
        context = context,
        error_code = error.code(),
        error = %error,
        "platform error occurred"
    );
}
