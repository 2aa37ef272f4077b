//! Outbound side channels: the internal operations notifier and submitter email.

mod dispatch;
mod log;
mod traits;
mod webhook;

pub use dispatch::{deliver_best_effort, spawn_best_effort};
pub use log::{LogMailer, LogNotifier};
pub use traits::{Mailer, Notifier, NotifyError, OutboundEmail};
pub use webhook::{RelayMailer, WebhookNotifier};

use std::sync::Arc;

use crate::config::{MailerConfig, NotifierConfig};

/// Build the notifier described by the config.
///
/// Without a webhook URL notifications are only logged.
pub fn create_notifier(config: &NotifierConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    match &config.webhook_url {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(config, url.clone())?)),
        None => Ok(Arc::new(LogNotifier::new(config.channel.clone()))),
    }
}

/// Build the mailer described by the config.
///
/// Without a relay URL emails are only logged.
pub fn create_mailer(config: &MailerConfig) -> Result<Arc<dyn Mailer>, NotifyError> {
    match &config.relay_url {
        Some(url) => Ok(Arc::new(RelayMailer::new(config, url.clone())?)),
        None => Ok(Arc::new(LogMailer::new(config.sender.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_notifier_without_webhook_logs() {
        let config = NotifierConfig {
            channel: "it-ops".to_string(),
            webhook_url: None,
            timeout_secs: 5,
        };
        let notifier = create_notifier(&config).unwrap();
        assert_eq!(notifier.channel(), "it-ops");
        assert!(notifier.publish("Subject", "Body").await.is_ok());
    }

    #[tokio::test]
    async fn test_create_mailer_without_relay_logs() {
        let config = MailerConfig {
            sender: "support@example.com".to_string(),
            relay_url: None,
            timeout_secs: 5,
        };
        let mailer = create_mailer(&config).unwrap();
        assert_eq!(mailer.sender(), "support@example.com");

        let email = OutboundEmail {
            to: "ada@example.com".to_string(),
            subject: "Hi".to_string(),
            body: "Body".to_string(),
        };
        assert!(mailer.send(&email).await.is_ok());
    }

    #[test]
    fn test_create_notifier_with_webhook() {
        let config = NotifierConfig {
            channel: "it-ops".to_string(),
            webhook_url: Some("http://localhost:9999/hook".to_string()),
            timeout_secs: 5,
        };
        let notifier = create_notifier(&config).unwrap();
        assert_eq!(notifier.channel(), "it-ops");
    }
}
