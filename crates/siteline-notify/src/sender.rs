//! Email delivery seam and its SMTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

use siteline_core::config::EmailConfig;

use crate::error::NotifyError;

/// A fully rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Delivers rendered email.
///
/// Implementations never return errors: any failure is logged and reported
/// as `false`.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> bool;
}

// =============================================================================
// SMTP
// =============================================================================

/// SMTP delivery via lettre's async transport.
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    timeout: Duration,
}

impl SmtpEmailSender {
    /// Build a sender from the `[email]` config section.
    ///
    /// The SMTP password is read from the environment variable named by
    /// `password_env` when a username is configured.
    pub fn from_config(config: &EmailConfig) -> Result<Self, NotifyError> {
        if config.smtp_host.trim().is_empty() {
            return Err(NotifyError::NotConfigured("smtp_host is empty".to_string()));
        }

        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let builder = match config.tls.as_str() {
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| NotifyError::Transport(e.to_string()))?,
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host),
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| NotifyError::Transport(e.to_string()))?,
        };
        let mut builder = builder.port(config.smtp_port).timeout(Some(timeout));

        if !config.username.is_empty() {
            let password = std::env::var(&config.password_env).map_err(|_| {
                NotifyError::NotConfigured(format!(
                    "password env '{}' is not set",
                    config.password_env
                ))
            })?;
            builder = builder.credentials(Credentials::new(config.username.clone(), password));
        }

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            tls = %config.tls,
            "SMTP email sender configured"
        );

        Ok(Self {
            transport: builder.build(),
            timeout,
        })
    }

    async fn try_send(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        let message = build_message(email)?;
        match tokio::time::timeout(self.timeout, self.transport.send(message)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(NotifyError::Transport(e.to_string())),
            Err(_) => Err(NotifyError::Timeout(self.timeout.as_secs())),
        }
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, email: &OutboundEmail) -> bool {
        match self.try_send(email).await {
            Ok(()) => {
                info!(subject = %email.subject, recipients = email.to.len(), "Email sent");
                true
            }
            Err(e) => {
                warn!(subject = %email.subject, error = %e, "Email delivery failed");
                false
            }
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Assemble a multipart/alternative message from a rendered email.
pub fn build_message(email: &OutboundEmail) -> Result<Message, NotifyError> {
    if email.to.is_empty() {
        return Err(NotifyError::NotConfigured("no recipients".to_string()));
    }

    let mut builder = Message::builder()
        .from(parse_mailbox(&email.from)?)
        .subject(email.subject.as_str());
    for to in &email.to {
        builder = builder.to(parse_mailbox(to)?);
    }

    builder
        .multipart(MultiPart::alternative_plain_html(
            email.text.clone(),
            email.html.clone(),
        ))
        .map_err(|e| NotifyError::Build(e.to_string()))
}

// =============================================================================
// Disabled
// =============================================================================

/// Sender used when email is switched off or misconfigured.
///
/// Every delivery reports failure, which routes callers onto their degraded
/// "we recorded your details" path.
pub struct DisabledEmailSender {
    reason: String,
}

impl DisabledEmailSender {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl EmailSender for DisabledEmailSender {
    async fn send(&self, email: &OutboundEmail) -> bool {
        debug!(subject = %email.subject, reason = %self.reason, "Email disabled; not sent");
        false
    }
}
