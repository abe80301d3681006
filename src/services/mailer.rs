//! Outbound mail over SMTP.

use futures_util::future::BoxFuture;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{error, info};
use std::fmt;

use crate::config::Config;

pub const SUBJECT_PREFIX: &str = "[VELOMATCHR]";

/// One message, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailError(pub String);

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MailError {}

/// Sends a message in a single attempt. Success carries the server's reply.
pub trait MailTransport: Send + Sync {
    fn send(&self, message: MailMessage) -> BoxFuture<'_, Result<String, MailError>>;
}

/// Adds the `[VELOMATCHR]` tag unless the subject already has it.
pub fn prefixed_subject(subject: &str) -> String {
    if subject.contains(SUBJECT_PREFIX) {
        subject.to_string()
    } else {
        format!("{} {}", SUBJECT_PREFIX, subject)
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// `SMTP_SECURE` selects implicit TLS, otherwise STARTTLS is used when offered.
    /// Certificates are not verified.
    pub fn from_config(config: &Config) -> Result<Self, MailError> {
        let tls_parameters = TlsParameters::builder(config.smtp_host.clone())
            .dangerous_accept_invalid_certs(true)
            .build()
            .map_err(|e| MailError(e.to_string()))?;

        let tls = if config.smtp_secure {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .tls(tls);

        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_pass.clone(),
            ));
        }

        Ok(SmtpMailer {
            transport: builder.build(),
        })
    }
}

pub fn build_message(message: &MailMessage) -> Result<Message, MailError> {
    let from: Mailbox = message
        .from
        .parse()
        .map_err(|e| MailError(format!("Invalid from address: {}", e)))?;
    let to: Mailbox = message
        .to
        .parse()
        .map_err(|e| MailError(format!("Invalid to address: {}", e)))?;

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone());

    let built = match (&message.text, &message.html) {
        (Some(text), Some(html)) => {
            builder.multipart(MultiPart::alternative_plain_html(text.clone(), html.clone()))
        }
        (None, Some(html)) => builder.header(ContentType::TEXT_HTML).body(html.clone()),
        (Some(text), None) => builder.header(ContentType::TEXT_PLAIN).body(text.clone()),
        (None, None) => builder.header(ContentType::TEXT_PLAIN).body(String::new()),
    };

    built.map_err(|e| MailError(e.to_string()))
}

impl MailTransport for SmtpMailer {
    fn send(&self, message: MailMessage) -> BoxFuture<'_, Result<String, MailError>> {
        Box::pin(async move {
            let email = build_message(&message)?;
            match self.transport.send(email).await {
                Ok(response) => {
                    let reply = response.message().collect::<Vec<_>>().join(" ");
                    info!("mail.sent to={} reply={}", message.to, reply);
                    Ok(format!("{} {}", response.code(), reply))
                }
                Err(e) => {
                    error!("mail.send.failed to={} {}", message.to, e);
                    Err(MailError(e.to_string()))
                }
            }
        })
    }
}
