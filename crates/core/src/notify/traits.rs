use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Endpoint rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A plain-text email addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Internal operations broadcast channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish a message under `subject`. Returns the channel's message ID.
    async fn publish(&self, subject: &str, message: &str) -> Result<String, NotifyError>;

    /// Identifier of the channel messages are published to.
    fn channel(&self) -> &str;
}

/// Transactional email sender.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send an email. Returns the provider's message ID.
    async fn send(&self, email: &OutboundEmail) -> Result<String, NotifyError>;

    /// Address every email is sent from.
    fn sender(&self) -> &str;
}
