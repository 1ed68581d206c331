use crate::error::EmailResult;
use handlebars::Handlebars;
use serde::Serialize;

pub const PASSWORD_RESET: &str = "password_reset";
pub const PAYMENT_CREATE_ERROR: &str = "payment_create_error";
pub const PAYMENT_CANCEL_ERROR: &str = "payment_cancel_error";

const PASSWORD_RESET_SUBJECT: &str = "Your password for {{domain}} has been reset";
const PASSWORD_RESET_BODY: &str = r#"Hello {{first_name}},

Your password for {{domain}} has been reset.

Username: {{username}}
New password: {{password}}

Please sign in and choose a new password.
"#;

const PAYMENT_CREATE_ERROR_SUBJECT: &str = "! Payment Create Error";
const PAYMENT_CREATE_ERROR_BODY: &str = r#"There was an error creating or changing a payment for {{account_name}}.
Account Id: {{account_id}}
Error: {{error}}

This should NOT happen unless the gateway interface is misconfigured
or the payment gateway changed its API.
"#;

const PAYMENT_CANCEL_ERROR_SUBJECT: &str = "! Payment Cancel Error";
const PAYMENT_CANCEL_ERROR_BODY: &str = r#"There was an error cancelling a payment for {{account_name}}.
Account Id: {{account_id}}
Old Payment Gateway Token: {{old_gateway_token}}
New Payment Gateway Token: {{#if new_gateway_token}}{{new_gateway_token}}{{else}}(no new payment){{/if}}
Error: {{error}}

The old subscription may still be billing. Cancel it at the gateway by hand.
"#;

/// Subject and body produced from one template pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// Plain-text mail templates; each name has a subject and a body part
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Renderer with the built-in templates registered
    ///
    /// # Errors
    ///
    /// Fails only if a built-in template does not parse.
    pub fn new() -> EmailResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        let mut renderer = Self { handlebars };
        renderer.register(PASSWORD_RESET, PASSWORD_RESET_SUBJECT, PASSWORD_RESET_BODY)?;
        renderer.register(
            PAYMENT_CREATE_ERROR,
            PAYMENT_CREATE_ERROR_SUBJECT,
            PAYMENT_CREATE_ERROR_BODY,
        )?;
        renderer.register(
            PAYMENT_CANCEL_ERROR,
            PAYMENT_CANCEL_ERROR_SUBJECT,
            PAYMENT_CANCEL_ERROR_BODY,
        )?;
        Ok(renderer)
    }

    /// Add or replace a template pair
    pub fn register(&mut self, name: &str, subject: &str, body: &str) -> EmailResult<()> {
        self.handlebars
            .register_template_string(&format!("{name}.subject"), subject)?;
        self.handlebars
            .register_template_string(&format!("{name}.body"), body)?;
        Ok(())
    }

    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> EmailResult<RenderedEmail> {
        let subject = self.handlebars.render(&format!("{name}.subject"), context)?;
        let body = self.handlebars.render(&format!("{name}.body"), context)?;
        Ok(RenderedEmail {
            subject: subject.trim().to_string(),
            body,
        })
    }
}
