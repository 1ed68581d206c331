use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration parsing failed: {0}")]
    ParseError(#[from] Box<figment::Error>),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Unknown subscription level: {0}")]
    UnknownLevel(String),

    #[error("Invalid resource limit: {0}")]
    InvalidResourceLimit(String),
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        Self::ParseError(Box::new(error))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
