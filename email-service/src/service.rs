use crate::error::EmailResult;
use crate::notifier::OperatorNotifier;
use crate::sender::{EmailMessage, EmailSender};
use crate::templates::TemplateRenderer;
use serde::Serialize;
use std::sync::Arc;

/// Renders templates and hands the result to a sender or the operators
pub struct EmailService {
    renderer: TemplateRenderer,
    sender: Arc<dyn EmailSender>,
    notifier: Arc<dyn OperatorNotifier>,
    from_address: String,
}

impl EmailService {
    pub fn new(
        renderer: TemplateRenderer,
        sender: Arc<dyn EmailSender>,
        notifier: Arc<dyn OperatorNotifier>,
        from_address: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            sender,
            notifier,
            from_address: from_address.into(),
        }
    }

    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    pub async fn send_template<T: Serialize + Sync>(
        &self,
        recipient: &str,
        template: &str,
        context: &T,
    ) -> EmailResult<()> {
        let rendered = self.renderer.render(template, context)?;
        let message = EmailMessage {
            from: self.from_address.clone(),
            to: vec![recipient.to_string()],
            subject: rendered.subject,
            body: rendered.body,
        };
        self.sender.send(&message).await?;
        tracing::debug!(template = template, "templated email sent");
        Ok(())
    }

    /// Render `template` and pass it to the operator channel once
    pub async fn alert_operators<T: Serialize + Sync>(&self, template: &str, context: &T) -> EmailResult<()> {
        let rendered = self.renderer.render(template, context)?;
        self.notifier
            .notify_operator(&rendered.subject, &rendered.body)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::MailNotifier;
    use crate::sender::InMemoryOutbox;
    use crate::templates::{PASSWORD_RESET, PAYMENT_CREATE_ERROR};
    use config_engine::MailSettings;
    use serde_json::json;

    fn service(operators: &[&str]) -> (EmailService, Arc<InMemoryOutbox>) {
        let outbox = Arc::new(InMemoryOutbox::new());
        let settings = MailSettings {
            from_address: "billing@example.com".to_string(),
            operators: operators.iter().map(|o| (*o).to_string()).collect(),
        };
        let notifier = Arc::new(MailNotifier::new(outbox.clone(), settings.clone()));
        let service = EmailService::new(
            TemplateRenderer::new().unwrap(),
            outbox.clone(),
            notifier,
            settings.from_address,
        );
        (service, outbox)
    }

    #[tokio::test]
    async fn test_send_template() {
        let (service, outbox) = service(&[]);
        service
            .send_template(
                "ada@example.com",
                PASSWORD_RESET,
                &json!({"first_name": "Ada", "domain": "acme.example.com", "username": "ada", "password": "x1y2z3"}),
            )
            .await
            .unwrap();

        let sent = outbox.sent_to("ada@example.com").await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "billing@example.com");
        assert!(sent[0].body.contains("x1y2z3"));
    }

    #[tokio::test]
    async fn test_alert_reaches_every_operator_once() {
        let (service, outbox) = service(&["ops@example.com", "cto@example.com"]);
        service
            .alert_operators(
                PAYMENT_CREATE_ERROR,
                &json!({"account_name": "Acme", "account_id": "1", "error": "timeout"}),
            )
            .await
            .unwrap();

        let messages = outbox.messages().await;
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_addressed_to("ops@example.com"));
        assert!(messages[0].is_addressed_to("CTO@example.com"));
        assert_eq!(messages[0].subject, "! Payment Create Error");
    }

    #[tokio::test]
    async fn test_alert_without_operators_is_not_an_error() {
        let (service, outbox) = service(&[]);
        service
            .alert_operators(
                PAYMENT_CREATE_ERROR,
                &json!({"account_name": "Acme", "account_id": "1", "error": "timeout"}),
            )
            .await
            .unwrap();
        assert!(outbox.messages().await.is_empty());
    }
}
