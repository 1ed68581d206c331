use thiserror::Error;

/// Malformed role expression
///
/// Raised only for configuration defects. Never shown to end users and never
/// retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleExpressionError {
    #[error("unexpected '{found}' at offset {offset} in role expression {source_text:?}")]
    UnexpectedToken {
        source_text: String,
        found: String,
        offset: usize,
    },

    #[error("role expression {source_text:?} ended early")]
    UnexpectedEnd { source_text: String },

    #[error("unbalanced parenthesis at offset {offset} in role expression {source_text:?}")]
    UnbalancedParenthesis { source_text: String, offset: usize },
}

pub type Result<T> = std::result::Result<T, RoleExpressionError>;
