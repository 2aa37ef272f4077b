//! Logging-only adapters, used when no endpoint is configured.

use async_trait::async_trait;
use tracing::info;

use super::{Mailer, Notifier, NotifyError, OutboundEmail};

/// Writes notifications to the log instead of a remote channel.
pub struct LogNotifier {
    channel: String,
}

impl LogNotifier {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<String, NotifyError> {
        let id = uuid::Uuid::new_v4().to_string();
        info!(channel = %self.channel, message_id = %id, "{}\n{}", subject, message);
        Ok(id)
    }

    fn channel(&self) -> &str {
        &self.channel
    }
}

/// Writes outgoing email to the log instead of a relay.
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, NotifyError> {
        let id = uuid::Uuid::new_v4().to_string();
        info!(
            from = %self.sender,
            to = %email.to,
            message_id = %id,
            "{}\n{}",
            email.subject,
            email.body
        );
        Ok(id)
    }

    fn sender(&self) -> &str {
        &self.sender
    }
}
