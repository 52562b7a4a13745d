//! SMTP relay client. One connection per dispatch: verify the session,
//! send, done. No retry, no connection pooling.

use std::time::Duration;

use lettre::message::header::{ContentType, MessageId};
use lettre::message::{Attachment, Body, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::email_config::EmailConfig;
use crate::models::outbound::OutboundMessage;

pub struct MailRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_name: String,
    from_addr: String,
}

impl MailRelay {
    /// Open a transport for the stored profile and verify it with a full
    /// SMTP session (EHLO, TLS, AUTH). Auth rejections surface as
    /// `SmtpAuth`, everything else as `SmtpConnect`.
    pub async fn connect(config: &EmailConfig, timeout: Duration) -> Result<Self, AppError> {
        // Trim whitespace that may sneak in from copied app passwords
        let password: String = config
            .smtp_password
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let creds = Credentials::new(config.smtp_user.clone(), password);

        let tls = TlsParameters::builder(config.smtp_host.clone())
            .build()
            .map_err(|e| AppError::SmtpConnect(e.to_string()))?;

        let builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .authentication(vec![Mechanism::Plain, Mechanism::Login])
                .credentials(creds)
                .timeout(Some(timeout));

        // smtp_secure means TLS from the first byte (port 465 style),
        // otherwise STARTTLS when the server offers it.
        let builder = if config.smtp_secure {
            builder.tls(Tls::Wrapper(tls))
        } else {
            builder.tls(Tls::Opportunistic(tls))
        };

        let transport = builder.build();

        match transport.test_connection().await {
            Ok(true) => {}
            Ok(false) => {
                return Err(AppError::SmtpConnect(
                    "server did not accept the connection".to_string(),
                ))
            }
            Err(e) if e.is_permanent() => return Err(AppError::SmtpAuth(e.to_string())),
            Err(e) => return Err(AppError::SmtpConnect(e.to_string())),
        }

        Ok(Self {
            transport,
            from_name: config.email_from_name.clone(),
            from_addr: config.email_from.clone(),
        })
    }

    /// Send one message, returning its Message-Id.
    pub async fn send(&self, outbound: &OutboundMessage) -> Result<String, AppError> {
        let (message, message_id) = build_mime(&self.from_name, &self.from_addr, outbound)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::SmtpSend(e.to_string()))?;
        Ok(message_id)
    }
}

/// Assemble the MIME message with an explicit Message-Id. Returns
/// (message, message_id); the id is `uuid@sender-domain`.
pub(crate) fn build_mime(
    from_name: &str,
    from_addr: &str,
    outbound: &OutboundMessage,
) -> Result<(Message, String), AppError> {
    let from_address = from_addr
        .parse()
        .map_err(|e: lettre::address::AddressError| AppError::SmtpSend(e.to_string()))?;
    let from = Mailbox::new(Some(from_name.to_string()), from_address);
    let to: Mailbox = outbound
        .to
        .parse()
        .map_err(|e: lettre::address::AddressError| AppError::SmtpSend(e.to_string()))?;

    let domain = from_addr.split('@').nth(1).unwrap_or("localhost");
    let message_id = format!("{}@{}", Uuid::new_v4(), domain);

    let alternative = match (&outbound.text, &outbound.html) {
        (Some(text), Some(html)) => MultiPart::alternative_plain_html(text.clone(), html.clone()),
        (Some(text), None) => MultiPart::alternative().singlepart(SinglePart::plain(text.clone())),
        (None, Some(html)) => MultiPart::alternative().singlepart(SinglePart::html(html.clone())),
        (None, None) => return Err(AppError::SmtpSend("message has no body".to_string())),
    };

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(&outbound.subject)
        .header(MessageId::from(message_id.clone()));

    let message = if outbound.attachments.is_empty() {
        builder.multipart(alternative)
    } else {
        let mut mixed = MultiPart::mixed().multipart(alternative);
        for attachment in &outbound.attachments {
            let content_type = ContentType::parse("application/octet-stream")
                .map_err(|e| AppError::SmtpSend(e.to_string()))?;
            mixed = mixed.singlepart(
                Attachment::new(attachment.filename.clone())
                    .body(Body::new(attachment.content.clone()), content_type),
            );
        }
        builder.multipart(mixed)
    }
    .map_err(|e| AppError::SmtpSend(e.to_string()))?;

    Ok((message, message_id))
}
