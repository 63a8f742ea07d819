//! Outgoing email.
//!
//! `Mailer` is the seam; `LogMailer` only writes to the log, `HttpMailer`
//! posts to a transactional mail API.

pub mod http;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub use http::HttpMailer;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("mail api rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Verification email pointing at `GET /users/verify/:token`.
pub fn verification_email(to: &str, public_base_url: &str, verification_token: &str) -> EmailMessage {
    let link = format!("{}/users/verify/{}", public_base_url.trim_end_matches('/'), verification_token);
    EmailMessage {
        to: to.to_string(),
        subject: "Verify your email".to_string(),
        html: format!(r#"<a target="_blank" href="{link}">Click to verify your email</a>"#),
    }
}

/// Logs messages instead of delivering them. Used when no mail API is configured.
pub struct LogMailer {
    pub from: String,
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(from = %self.from, to = %message.to, subject = %message.subject, html = %message.html, "mail_not_sent_log_only");
        Ok(())
    }
}

/// Recording mailer for tests
pub mod mock {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    impl RecordingMailer {
        /// A mailer whose every send fails with a transport error.
        pub fn failing() -> Self {
            Self { sent: Mutex::new(Vec::new()), fail: true }
        }

        pub async fn sent(&self) -> Vec<EmailMessage> {
            self.sent.lock().await.clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Transport("connection refused".into()));
            }
            self.sent.lock().await.push(message.clone());
            Ok(())
        }
    }
}
