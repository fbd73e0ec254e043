//! Outbound email seam.
//!
//! Registration sends a welcome email off the request path via
//! `tokio::spawn`; a send failure is logged and never surfaces to the
//! caller. The default implementation only logs, which is also what test
//! and development environments want.

use async_trait::async_trait;
use tracing::info;

use crate::logging::pii::Redacted;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_welcome(&self, email: &str, first_name: &str) -> Result<(), MailError>;

    /// Deliver an email verification token. The token is single-purpose
    /// and expires on its own; it must not appear in logs.
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailError>;
}

#[derive(Debug, thiserror::Error)]
#[error("mail error: {0}")]
pub struct MailError(pub String);

/// Mailer that records the send as a structured log line instead of
/// talking to a provider.
#[derive(Debug, Default, Clone)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send_welcome(&self, email: &str, first_name: &str) -> Result<(), MailError> {
        info!(email = %Redacted(email), first_name, "welcome email queued");
        Ok(())
    }

    async fn send_verification(&self, email: &str, _token: &str) -> Result<(), MailError> {
        info!(email = %Redacted(email), "verification email queued");
        Ok(())
    }
}
