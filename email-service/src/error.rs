use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Template error: {0}")]
    TemplateError(#[from] Box<handlebars::TemplateError>),

    #[error("Render error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    #[error("Message has no recipients")]
    NoRecipients,
}

impl From<handlebars::TemplateError> for EmailError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::TemplateError(Box::new(err))
    }
}

pub type EmailResult<T> = Result<T, EmailError>;
