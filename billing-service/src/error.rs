use error_common::{codes, PlatformError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One `(code, text)` pair reported by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayMessage {
    pub code: String,
    pub text: String,
}

impl GatewayMessage {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for GatewayMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.text)
    }
}

/// The two ways a gateway call can fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The gateway rejected caller supplied data; safe to show and re-prompt
    #[error("Gateway rejected the request: {}", join_messages(.messages))]
    Request { messages: Vec<GatewayMessage> },

    /// Unknown outcome: unexpected payload, transport failure or timeout
    #[error("Unexpected gateway response: {payload}")]
    Response { payload: String },
}

impl GatewayError {
    pub fn response(payload: impl Into<String>) -> Self {
        Self::Response {
            payload: payload.into(),
        }
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Self::Response { .. })
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Request { .. } => codes::gateway::REQUEST_REJECTED,
            Self::Response { .. } => codes::gateway::RESPONSE_INVALID,
        }
    }
}

fn join_messages(messages: &[GatewayMessage]) -> String {
    messages
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum BillingError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] PlatformError),
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
pub type Result<T> = std::result::Result<T, BillingError>;
