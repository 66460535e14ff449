//! Mail transports.

use super::config::MailConfig;
use super::errors::MailResult;
use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

/// A single HTML message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Trait for sending mail, implemented by SMTP and by test doubles
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message
    async fn send(&self, mail: OutgoingMail) -> MailResult<()>;
}

/// SMTP mailer backed by a pooled lettre transport
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    /// Create a new SMTP mailer
    ///
    /// No connection is opened until the first message is sent.
    ///
    /// # Errors
    ///
    /// * `MailError::Address` - Sender is not a valid address
    /// * `MailError::Transport` - TLS setup for the relay failed
    pub fn new(config: &MailConfig) -> MailResult<Self> {
        let sender: Mailbox = config.sender_email.parse()?;

        let builder = if config.uses_starttls() {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        };

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender_email.clone(),
                config.app_password.clone(),
            ))
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(Self { transport, sender })
    }
}

/// Whether `addr` is a usable mail address
pub fn is_valid_address(addr: &str) -> bool {
    addr.parse::<lettre::Address>().is_ok()
}

/// Build a lettre message from an outgoing mail
pub fn build_message(from: &Mailbox, mail: OutgoingMail) -> MailResult<Message> {
    let message = Message::builder()
        .from(from.clone())
        .to(mail.to.parse()?)
        .subject(mail.subject)
        .header(ContentType::TEXT_HTML)
        .body(mail.html_body)?;
    Ok(message)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> MailResult<()> {
        let message = build_message(&self.sender, mail)?;
        self.transport.send(message).await?;
        Ok(())
    }
}
