use crate::error::AppError;

/// One message handed to the relay. Built from either inbound shape of the
/// dispatch endpoint, transient, never persisted.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub html: Option<String>,
    pub text: Option<String>,
    pub attachments: Vec<MessageAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

impl OutboundMessage {
    /// Normalize raw fields into a sendable message. Empty strings count as
    /// absent. At least one of html/text is required.
    pub fn build(
        to: Option<String>,
        subject: Option<String>,
        html: Option<String>,
        text: Option<String>,
        attachments: Vec<MessageAttachment>,
    ) -> Result<Self, AppError> {
        let to = non_empty(to);
        let subject = non_empty(subject);
        let html = non_empty(html);
        let text = non_empty(text);

        match (to, subject) {
            (Some(to), Some(subject)) if html.is_some() || text.is_some() => Ok(Self {
                to,
                subject,
                html,
                text,
                attachments,
            }),
            _ => Err(AppError::Validation(
                "Missing required fields: to, subject, html or text".to_string(),
            )),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
