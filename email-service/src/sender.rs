use crate::error::{EmailError, EmailResult};
use async_trait::async_trait;
use logger_redacted::PiiRedactor;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn is_addressed_to(&self, recipient: &str) -> bool {
        self.to.iter().any(|to| to.eq_ignore_ascii_case(recipient))
    }
}

/// Delivery mechanism for outbound mail
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> EmailResult<()>;
}

/// Keeps every message in memory; used by tests and local runs
#[derive(Default)]
pub struct InMemoryOutbox {
    messages: Mutex<Vec<EmailMessage>>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<EmailMessage> {
        self.messages.lock().await.clone()
    }

    pub async fn sent_to(&self, recipient: &str) -> Vec<EmailMessage> {
        self.messages
            .lock()
            .await
            .iter()
            .filter(|message| message.is_addressed_to(recipient))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EmailSender for InMemoryOutbox {
    async fn send(&self, message: &EmailMessage) -> EmailResult<()> {
        if message.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        self.messages.lock().await.push(message.clone());
        Ok(())
    }
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Default)]
pub struct TracingSender {
    redactor: PiiRedactor,
}

impl TracingSender {
    pub fn new(redactor: PiiRedactor) -> Self {
        Self { redactor }
    }
}

#[async_trait]
impl EmailSender for TracingSender {
    async fn send(&self, message: &EmailMessage) -> EmailResult<()> {
        if message.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }
        tracing::info!(
            from = %message.from,
            to = %self.redactor.redact(&message.to.join(", ")),
            subject = %message.subject,
            "outbound email"
        );
        Ok(())
    }
}
