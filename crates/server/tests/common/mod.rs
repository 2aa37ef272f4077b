//! Common test utilities for end-to-end testing with mocks.
//!
//! Builds an in-process server over a temporary SQLite store, with the
//! notifier and mailer replaced by mocks and a live intake consumer, so
//! requests travel the same path they do in production.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use helpdesk_core::{
    create_intake_queue, load_config_from_str,
    testing::{MockMailer, MockNotifier},
    Config, IntakeConsumer, IntakeProcessor, KeywordTable, Mailer, Notifier, RequesterRecord,
    RequesterStore, SqliteRequesterStore, StalenessSweeper, UrgencyScorer,
};
use helpdesk_server::state::AppState;

/// Re-export fixtures for test convenience
pub use helpdesk_core::testing::fixtures;

/// Test fixture for end-to-end testing with mock side channels.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_submit() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/tickets", json!({ ... })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Requester store backing both intake and the sweeper
    pub store: Arc<dyn RequesterStore>,
    /// Mock team notification channel
    pub notifier: Arc<MockNotifier>,
    /// Mock submitter mailer
    pub mailer: Arc<MockMailer>,
    /// Loaded configuration
    pub config: Config,
    /// Consumer held back when the test wants the queue to fill up
    pub idle_consumer: Option<IntakeConsumer>,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default settings.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let toml = format!(
            r#"
[server]
host = "127.0.0.1"
port = 0
allowed_origin = "{origin}"

[database]
path = "{path}"
table = "requesters"

[queue]
name = "ticket-intake-test"
buffer_size = {buffer}

[notifier]
channel = "it-ops-test"

[mailer]
sender = "support@example.com"

[sweeper]
enabled = false
stale_after_secs = {stale_after}
page_size = 2
"#,
            origin = test_config.allowed_origin,
            path = db_path.display(),
            buffer = test_config.queue_buffer,
            stale_after = test_config.stale_after_secs,
        );
        let config = load_config_from_str(&toml).expect("Failed to parse test config");

        let store: Arc<dyn RequesterStore> = Arc::new(
            SqliteRequesterStore::new(&config.database.path, &config.database.table)
                .expect("Failed to create requester store"),
        );

        let notifier = Arc::new(MockNotifier::new());
        let mailer = Arc::new(MockMailer::new());

        let processor = IntakeProcessor::new(
            Arc::clone(&store),
            UrgencyScorer::new(Arc::new(KeywordTable::builtin())),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            Arc::clone(&mailer) as Arc<dyn Mailer>,
        );
        let (queue, consumer) = create_intake_queue(&config.queue, Arc::new(processor));
        let idle_consumer = if test_config.start_consumer {
            tokio::spawn(consumer.run());
            None
        } else {
            Some(consumer)
        };

        let sweeper = StalenessSweeper::new(
            Arc::clone(&store),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            config.sweeper.clone(),
            Duration::from_secs(1),
        );

        let state = Arc::new(AppState::new(
            config.clone(),
            Arc::clone(&store),
            queue,
            sweeper,
        ));
        let router = helpdesk_server::api::create_router(state);

        Self {
            router,
            store,
            notifier,
            mailer,
            config,
            idle_consumer,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with no body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send an OPTIONS request.
    pub async fn options(&self, path: &str) -> TestResponse {
        self.request("OPTIONS", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    /// Poll the store until a record for `email` holds `tickets` tickets.
    pub async fn wait_for_tickets(&self, email: &str, tickets: usize) -> Option<RequesterRecord> {
        for _ in 0..100 {
            if let Ok(Some(record)) = self.store.get(email) {
                if record.tickets.len() >= tickets {
                    return Some(record);
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        None
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Value of the Access-Control-Allow-Origin header
    pub allowed_origin: String,
    /// Intake queue capacity
    pub queue_buffer: usize,
    /// Spawn the intake consumer
    pub start_consumer: bool,
    /// Staleness threshold for the sweeper
    pub stale_after_secs: i64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            allowed_origin: "*".to_string(),
            queue_buffer: 16,
            start_consumer: true,
            stale_after_secs: 604_800,
        }
    }
}

impl TestConfig {
    /// Config whose queue is never drained.
    pub fn without_consumer(queue_buffer: usize) -> Self {
        Self {
            queue_buffer,
            start_consumer: false,
            ..Default::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
