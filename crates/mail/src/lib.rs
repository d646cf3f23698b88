//! Transactional email for account flows.
//!
//! - [`Mailer`] -- sends [`OutgoingMail`] over SMTP, to the log, or to an
//!   in-memory [`Outbox`].
//! - [`templates`] -- verification and password-reset messages.

pub mod templates;

use std::sync::{Arc, Mutex};

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// MailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@quranic-transformation.local";

/// Configuration for the SMTP transport.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that mail should
    /// be logged rather than sent.
    ///
    /// | Variable        | Required | Default                                |
    /// |-----------------|----------|----------------------------------------|
    /// | `SMTP_HOST`     | yes      | --                                     |
    /// | `SMTP_PORT`     | no       | `587`                                  |
    /// | `SMTP_FROM`     | no       | `noreply@quranic-transformation.local` |
    /// | `SMTP_USER`     | no       | --                                     |
    /// | `SMTP_PASSWORD` | no       | --                                     |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// A plain-text message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Messages captured by an in-memory mailer.
#[derive(Debug, Clone, Default)]
pub struct Outbox(Arc<Mutex<Vec<OutgoingMail>>>);

impl Outbox {
    /// Snapshot of every captured message, oldest first.
    pub fn messages(&self) -> Vec<OutgoingMail> {
        self.0.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// The most recent message sent to `to`, if any.
    pub fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        self.messages().into_iter().rev().find(|m| m.to == to)
    }

    fn push(&self, mail: OutgoingMail) {
        if let Ok(mut messages) = self.0.lock() {
            messages.push(mail);
        }
    }
}

enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Log,
    Memory(Outbox),
}

/// Sends account emails through the configured transport.
pub struct Mailer {
    from_address: String,
    transport: Transport,
}

impl Mailer {
    /// Build an SMTP mailer from configuration.
    pub fn smtp(config: &MailConfig) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from_address: config.from_address.clone(),
            transport: Transport::Smtp(builder.build()),
        })
    }

    /// A mailer that only logs messages. Used when SMTP is not configured.
    pub fn log_only() -> Self {
        Self {
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            transport: Transport::Log,
        }
    }

    /// A mailer that captures messages in memory, and the handle to read them.
    pub fn in_memory() -> (Self, Outbox) {
        let outbox = Outbox::default();
        let mailer = Self {
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            transport: Transport::Memory(outbox.clone()),
        };
        (mailer, outbox)
    }

    /// SMTP when `SMTP_HOST` is set, otherwise log-only.
    pub fn from_env() -> Result<Self, MailError> {
        match MailConfig::from_env() {
            Some(config) => Self::smtp(&config),
            None => {
                tracing::warn!("SMTP_HOST not set; account emails will be logged, not sent");
                Ok(Self::log_only())
            }
        }
    }

    /// Whether messages leave the process. False for the log-only transport.
    pub fn delivers(&self) -> bool {
        !matches!(self.transport, Transport::Log)
    }

    /// Send a message.
    pub async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        match &self.transport {
            Transport::Smtp(transport) => {
                let message = Message::builder()
                    .from(self.from_address.parse()?)
                    .to(mail.to.parse()?)
                    .subject(mail.subject.clone())
                    .header(ContentType::TEXT_PLAIN)
                    .body(mail.body)
                    .map_err(|e| MailError::Build(e.to_string()))?;
                transport.send(message).await?;
                tracing::info!(to = %mail.to, subject = %mail.subject, "Email sent");
            }
            Transport::Log => {
                tracing::info!(to = %mail.to, subject = %mail.subject, body = %mail.body, "Email (not sent)");
            }
            Transport::Memory(outbox) => outbox.push(mail),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        std::env::remove_var("SMTP_HOST");
        assert!(MailConfig::from_env().is_none());
    }

    #[test]
    fn mail_error_display_build() {
        let err = MailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[test]
    fn mail_error_display_address() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = MailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }

    #[tokio::test]
    async fn in_memory_mailer_captures_messages() {
        let (mailer, outbox) = Mailer::in_memory();
        mailer
            .send(OutgoingMail {
                to: "a@example.com".into(),
                subject: "first".into(),
                body: "one".into(),
            })
            .await
            .unwrap();
        mailer
            .send(OutgoingMail {
                to: "a@example.com".into(),
                subject: "second".into(),
                body: "two".into(),
            })
            .await
            .unwrap();

        assert_eq!(outbox.messages().len(), 2);
        assert_eq!(outbox.last_to("a@example.com").unwrap().subject, "second");
        assert!(outbox.last_to("b@example.com").is_none());
    }

    #[tokio::test]
    async fn log_only_mailer_accepts_any_message() {
        let mailer = Mailer::log_only();
        let result = mailer
            .send(OutgoingMail {
                to: "x@example.com".into(),
                subject: "s".into(),
                body: "b".into(),
            })
            .await;
        assert!(result.is_ok());
    }
}
