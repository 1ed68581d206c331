use crate::error::EmailResult;
use crate::sender::{EmailMessage, EmailSender};
use async_trait::async_trait;
use config_engine::MailSettings;
use std::sync::Arc;

/// Out-of-band channel to the people operating the platform
#[async_trait]
pub trait OperatorNotifier: Send + Sync {
    async fn notify_operator(&self, subject: &str, body: &str) -> EmailResult<()>;
}

/// Mails every configured operator
pub struct MailNotifier {
    sender: Arc<dyn EmailSender>,
    settings: MailSettings,
}

impl MailNotifier {
    pub fn new(sender: Arc<dyn EmailSender>, settings: MailSettings) -> Self {
        Self { sender, settings }
    }
}

#[async_trait]
impl OperatorNotifier for MailNotifier {
    async fn notify_operator(&self, subject: &str, body: &str) -> EmailResult<()> {
        // The alert is still visible in the log when nobody is configured
        tracing::error!(subject = subject, "operator alert");
        if self.settings.operators.is_empty() {
            tracing::warn!("no operators configured, alert not mailed");
            return Ok(());
        }

        let message = EmailMessage {
            from: self.settings.from_address.clone(),
            to: self.settings.operators.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
        };
        self.sender.send(&message).await
    }
}
