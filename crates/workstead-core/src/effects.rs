//! Collaborator traits for best-effort side effects.
//!
//! Email delivery and realtime fan-out happen after the transaction
//! that produced the underlying change has committed. Their failures
//! are logged and reported as flags — never escalated into a rollback.

use thiserror::Error;

use crate::models::announcement::Announcement;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct EffectError(pub String);

/// Outgoing email payload handed to the SMTP-capable collaborator.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub trait Mailer: Send + Sync {
    fn send(&self, message: EmailMessage) -> impl Future<Output = Result<(), EffectError>> + Send;
}

pub trait Announcer: Send + Sync {
    fn publish(
        &self,
        announcement: Announcement,
    ) -> impl Future<Output = Result<(), EffectError>> + Send;
}

/// Mailer used when no SMTP credentials are configured. Every send
/// fails recoverably, so callers report `email_sent = false` and the
/// secure link stays retrievable out-of-band.
#[derive(Debug, Clone, Default)]
pub struct NoopMailer;

impl Mailer for NoopMailer {
    async fn send(&self, _message: EmailMessage) -> Result<(), EffectError> {
        Err(EffectError("email transport is not configured".into()))
    }
}

/// Fan-out sink that drops announcements. Delivery is best-effort by
/// contract, so dropping is a valid implementation.
#[derive(Debug, Clone, Default)]
pub struct NoopAnnouncer;

impl Announcer for NoopAnnouncer {
    async fn publish(&self, _announcement: Announcement) -> Result<(), EffectError> {
        Ok(())
    }
}
