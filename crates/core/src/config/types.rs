use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub queue: QueueConfig,
    pub notifier: NotifierConfig,
    pub mailer: MailerConfig,
    #[serde(default)]
    pub sweeper: SweeperConfig,
    #[serde(default)]
    pub triage: TriageConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin echoed in `Access-Control-Allow-Origin` on intake responses.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_allowed_origin() -> String {
    "*".to_string()
}

/// Requester record store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// Store identifier: the table holding requester records.
    pub table: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("helpdesk.db")
}

/// Intake queue configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Queue destination identifier.
    pub name: String,
    /// Channel capacity before `enqueue` starts failing.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Maximum messages handed to the processor per invocation.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Deliveries attempted before a message is dead-lettered.
    #[serde(default = "default_max_deliveries")]
    pub max_deliveries: u32,
}

fn default_buffer_size() -> usize {
    1000
}

fn default_batch_size() -> usize {
    10
}

fn default_max_deliveries() -> u32 {
    3
}

/// Internal operations notification channel
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifierConfig {
    /// Notification channel identifier.
    pub channel: String,
    /// Webhook receiving published notifications. Logged only when absent.
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_send_timeout")]
    pub timeout_secs: u64,
}

/// Outbound email to submitters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailerConfig {
    /// Sender address used as `from` on every email.
    pub sender: String,
    /// HTTP mail relay endpoint. Logged only when absent.
    #[serde(default)]
    pub relay_url: Option<String>,
    #[serde(default = "default_send_timeout")]
    pub timeout_secs: u64,
}

fn default_send_timeout() -> u64 {
    10
}

/// Staleness sweeper configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweeperConfig {
    /// Run the sweeper on a schedule. The HTTP trigger works either way.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
    /// Age after which an open ticket is flagged stale.
    #[serde(default = "default_stale_after")]
    pub stale_after_secs: i64,
    /// Requester records read per store page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    24 * 60 * 60
}

fn default_stale_after() -> i64 {
    7 * 24 * 60 * 60
}

fn default_page_size() -> usize {
    100
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_secs: default_sweep_interval(),
            stale_after_secs: default_stale_after(),
            page_size: default_page_size(),
        }
    }
}

/// Urgency triage configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TriageConfig {
    /// TOML file of `"keyword" = weight` pairs replacing the builtin table.
    #[serde(default)]
    pub keywords_path: Option<PathBuf>,
}

/// Sanitized config for API responses (endpoints redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub queue: QueueConfig,
    pub notifier: SanitizedNotifierConfig,
    pub mailer: SanitizedMailerConfig,
    pub sweeper: SweeperConfig,
    pub triage: TriageConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedNotifierConfig {
    pub channel: String,
    pub webhook_configured: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMailerConfig {
    pub sender: String,
    pub relay_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            queue: config.queue.clone(),
            notifier: SanitizedNotifierConfig {
                channel: config.notifier.channel.clone(),
                webhook_configured: config.notifier.webhook_url.is_some(),
                timeout_secs: config.notifier.timeout_secs,
            },
            mailer: SanitizedMailerConfig {
                sender: config.mailer.sender.clone(),
                relay_configured: config.mailer.relay_url.is_some(),
                timeout_secs: config.mailer.timeout_secs,
            },
            sweeper: config.sweeper.clone(),
            triage: config.triage.clone(),
        }
    }
}
