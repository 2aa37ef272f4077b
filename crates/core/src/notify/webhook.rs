//! HTTP adapters for the notification channel and the mail relay.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Mailer, Notifier, NotifyError, OutboundEmail};
use crate::config::{MailerConfig, NotifierConfig};

#[derive(Debug, Serialize)]
struct PublishBody<'a> {
    channel: &'a str,
    subject: &'a str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct RelayBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct AcceptedResponse {
    #[serde(default)]
    message_id: Option<String>,
}

fn build_client(timeout_secs: u64) -> Result<Client, NotifyError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| NotifyError::Http(e.to_string()))
}

/// POST a JSON body and extract the message ID from the reply.
///
/// Endpoints that reply without a `message_id` get a locally generated one.
async fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    body: &T,
) -> Result<String, NotifyError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| NotifyError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let accepted: AcceptedResponse = response.json().await.unwrap_or_default();
    Ok(accepted
        .message_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()))
}

/// Publishes notifications to a webhook endpoint.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    channel: String,
}

impl WebhookNotifier {
    pub fn new(config: &NotifierConfig, url: impl Into<String>) -> Result<Self, NotifyError> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            url: url.into(),
            channel: config.channel.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn publish(&self, subject: &str, message: &str) -> Result<String, NotifyError> {
        let body = PublishBody {
            channel: &self.channel,
            subject,
            message,
        };
        let id = post_json(&self.client, &self.url, &body).await?;
        debug!("Published '{}' to {} ({})", subject, self.channel, id);
        Ok(id)
    }

    fn channel(&self) -> &str {
        &self.channel
    }
}

/// Sends email through an HTTP mail relay.
pub struct RelayMailer {
    client: Client,
    url: String,
    sender: String,
}

impl RelayMailer {
    pub fn new(config: &MailerConfig, url: impl Into<String>) -> Result<Self, NotifyError> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            url: url.into(),
            sender: config.sender.clone(),
        })
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<String, NotifyError> {
        let body = RelayBody {
            from: &self.sender,
            to: &email.to,
            subject: &email.subject,
            text: &email.body,
        };
        let id = post_json(&self.client, &self.url, &body).await?;
        debug!("Relayed email '{}' to {} ({})", email.subject, email.to, id);
        Ok(id)
    }

    fn sender(&self) -> &str {
        &self.sender
    }
}
