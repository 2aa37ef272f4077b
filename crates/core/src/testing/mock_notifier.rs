//! Mock notification channel and mailer for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::notify::{Mailer, Notifier, NotifyError, OutboundEmail};

/// A notification captured by [`MockNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub subject: String,
    pub message: String,
}

/// Mock implementation of the Notifier trait.
///
/// Records every publish, and can be told to fail or to stall so that
/// best-effort handling can be asserted.
pub struct MockNotifier {
    published: Arc<RwLock<Vec<PublishedMessage>>>,
    failing: Arc<RwLock<bool>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            published: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(false)),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Make every publish fail.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    /// Delay every publish by `delay` before answering.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Messages published so far.
    pub async fn published(&self) -> Vec<PublishedMessage> {
        self.published.read().await.clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<String, NotifyError> {
        if let Some(delay) = *self.delay.read().await {
            tokio::time::sleep(delay).await;
        }
        if *self.failing.read().await {
            return Err(NotifyError::Http("mock notifier failure".to_string()));
        }

        let mut published = self.published.write().await;
        published.push(PublishedMessage {
            subject: subject.to_string(),
            message: message.to_string(),
        });
        Ok(format!("mock-message-{}", published.len()))
    }

    fn channel(&self) -> &str {
        "mock-channel"
    }
}

/// Mock implementation of the Mailer trait.
pub struct MockMailer {
    sent: Arc<RwLock<Vec<OutboundEmail>>>,
    failing: Arc<RwLock<bool>>,
}

impl Default for MockMailer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMailer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(false)),
        }
    }

    /// Make every send fail.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    /// Emails sent so far.
    pub async fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, NotifyError> {
        if *self.failing.read().await {
            return Err(NotifyError::Rejected {
                status: 500,
                body: "mock mailer failure".to_string(),
            });
        }

        let mut sent = self.sent.write().await;
        sent.push(email.clone());
        Ok(format!("mock-email-{}", sent.len()))
    }

    fn sender(&self) -> &str {
        "support@example.com"
    }
}
