//! Delivery of password reset links.
//!
//! [`SmtpMailer`] sends multipart mail via lettre with Askama templates.
//! Without SMTP settings the server falls back to [`LogMailer`], which only
//! logs that a link was issued. [`MemoryMailer`] keeps messages for tests.

use std::sync::Mutex;

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use supplierdb_core::Email;

use crate::config::EmailConfig;

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetEmailHtml<'a> {
    name: &'a str,
    reset_url: &'a str,
    ttl_minutes: i64,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetEmailText<'a> {
    name: &'a str,
    reset_url: &'a str,
    ttl_minutes: i64,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// A password reset message ready to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetMessage {
    pub to: Email,
    pub name: String,
    pub reset_url: String,
    pub ttl_minutes: i64,
}

/// Sends password reset links.
#[async_trait]
pub trait ResetMailer: Send + Sync {
    /// Deliver a reset message.
    async fn send_reset_link(&self, message: &ResetMessage) -> Result<(), EmailError>;
}

/// Mailer that delivers over SMTP.
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create an SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[async_trait]
impl ResetMailer for SmtpMailer {
    async fn send_reset_link(&self, message: &ResetMessage) -> Result<(), EmailError> {
        let (html, text) = render_reset_email(message)?;
        self.send_multipart_email(message.to.as_str(), RESET_SUBJECT, text, html)
            .await
    }
}

/// Mailer that only logs, for deployments without SMTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl ResetMailer for LogMailer {
    async fn send_reset_link(&self, message: &ResetMessage) -> Result<(), EmailError> {
        // The link is a credential; only its recipient is logged.
        tracing::warn!(
            to = %message.to,
            "SMTP not configured, password reset email not sent"
        );
        Ok(())
    }
}

/// Mailer that keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<ResetMessage>>,
}

impl MemoryMailer {
    /// Create an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<ResetMessage> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResetMailer for MemoryMailer {
    async fn send_reset_link(&self, message: &ResetMessage) -> Result<(), EmailError> {
        // Render anyway so template errors surface in tests.
        render_reset_email(message)?;
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(message.clone());
        }
        Ok(())
    }
}

const RESET_SUBJECT: &str = "Reset your SupplierDB password";

/// Render the HTML and plain text bodies of a reset email.
fn render_reset_email(message: &ResetMessage) -> Result<(String, String), EmailError> {
    let html = PasswordResetEmailHtml {
        name: &message.name,
        reset_url: &message.reset_url,
        ttl_minutes: message.ttl_minutes,
    }
    .render()?;
    let text = PasswordResetEmailText {
        name: &message.name,
        reset_url: &message.reset_url,
        ttl_minutes: message.ttl_minutes,
    }
    .render()?;
    Ok((html, text))
}
