use billing_service::GatewayMessage;
use error_common::codes;
use serde::Serialize;

/// A message shown next to the form that caused it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub code: String,
    pub message: String,
}

impl Feedback {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(codes::validation::INVALID_INPUT, message)
    }

    pub fn missing(field: &str) -> Self {
        Self::new(
            codes::validation::MISSING_REQUIRED_FIELD,
            format!("{field} is required"),
        )
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(codes::validation::DUPLICATE_VALUE, message)
    }

    pub fn from_gateway(messages: Vec<GatewayMessage>) -> Vec<Self> {
        messages
            .into_iter()
            .map(|message| Self::new(message.code, message.text))
            .collect()
    }
}

/// How a workflow ended, as far as the caller is concerned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Redirect(String),
    /// Input was rejected locally or by the gateway; nothing was kept
    Invalid(Vec<Feedback>),
    /// Unknown gateway outcome; operators were alerted, prior state kept
    ProcessingError,
    /// The replacement is in place but the old subscription could not be
    /// cancelled and may still bill; operators were alerted
    CancelFailed { old_gateway_token: String },
    NotFound,
    Forbidden,
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn into_done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            _ => None,
        }
    }
}
