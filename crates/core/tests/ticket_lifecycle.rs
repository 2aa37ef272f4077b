//! Ticket lifecycle integration tests.
//!
//! These tests drive a ticket through the full path over a real SQLite store:
//! queued -> stored OPEN -> notified -> flagged STALE by the sweeper

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use helpdesk_core::{
    config::{QueueConfig, SweeperConfig},
    create_intake_queue,
    testing::{fixtures, MockMailer, MockNotifier},
    IntakeProcessor, IntakeQueue, KeywordTable, Mailer, Notifier, RequesterStore,
    SqliteRequesterStore, StalenessSweeper, TicketStatus, UrgencyScorer,
};

const DAY: i64 = 24 * 60 * 60;

/// Test helper wiring every component over one database.
struct TestHarness {
    store: Arc<dyn RequesterStore>,
    notifier: Arc<MockNotifier>,
    mailer: Arc<MockMailer>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let store: Arc<dyn RequesterStore> = Arc::new(
            SqliteRequesterStore::new(&db_path, "requesters")
                .expect("Failed to create requester store"),
        );

        Self {
            store,
            notifier: Arc::new(MockNotifier::new()),
            mailer: Arc::new(MockMailer::new()),
            _temp_dir: temp_dir,
        }
    }

    fn processor(&self) -> IntakeProcessor {
        IntakeProcessor::new(
            Arc::clone(&self.store),
            UrgencyScorer::new(Arc::new(KeywordTable::builtin())),
            Arc::clone(&self.notifier) as Arc<dyn Notifier>,
            Arc::clone(&self.mailer) as Arc<dyn Mailer>,
        )
    }

    fn start_queue(&self) -> (IntakeQueue, tokio::task::JoinHandle<()>) {
        let config = QueueConfig {
            name: "ticket-intake".to_string(),
            buffer_size: 16,
            batch_size: 4,
            max_deliveries: 3,
        };
        let (queue, consumer) = create_intake_queue(&config, Arc::new(self.processor()));
        (queue, tokio::spawn(consumer.run()))
    }

    fn sweeper(&self) -> StalenessSweeper {
        StalenessSweeper::new(
            Arc::clone(&self.store),
            Arc::clone(&self.notifier) as Arc<dyn Notifier>,
            SweeperConfig {
                enabled: true,
                interval_secs: 60,
                stale_after_secs: 7 * DAY,
                page_size: 2,
            },
            Duration::from_secs(1),
        )
    }
}

#[tokio::test]
async fn test_queued_tickets_are_stored_in_order() {
    let harness = TestHarness::new();
    let (queue, consumer) = harness.start_queue();

    for i in 0..5 {
        queue
            .enqueue(fixtures::ticket_message(
                &format!("Ticket-{}", i),
                "ada@example.com",
                1_700_000_000 + i,
            ))
            .unwrap();
    }

    // Dropping the last handle lets the consumer drain and stop.
    drop(queue);
    consumer.await.unwrap();

    let record = harness.store.get("ada@example.com").unwrap().unwrap();
    let ids: Vec<&str> = record.tickets.iter().map(|t| t.ticket_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["Ticket-0", "Ticket-1", "Ticket-2", "Ticket-3", "Ticket-4"]
    );
    assert!(record.tickets.iter().all(|t| t.status == TicketStatus::Open));
}

#[tokio::test]
async fn test_redelivered_message_is_stored_once() {
    let harness = TestHarness::new();
    let (queue, consumer) = harness.start_queue();

    let message = fixtures::ticket_message("Ticket-dup", "ada@example.com", 1_700_000_000);
    queue.enqueue(message.clone()).unwrap();
    queue.enqueue(message).unwrap();

    drop(queue);
    consumer.await.unwrap();

    let record = harness.store.get("ada@example.com").unwrap().unwrap();
    assert_eq!(record.tickets.len(), 1);
}

#[tokio::test]
async fn test_processing_dispatches_both_side_channels() {
    let harness = TestHarness::new();
    let processor = harness.processor();

    let outcome = processor
        .process(&fixtures::ticket_message(
            "Ticket-1",
            "ada@example.com",
            1_700_000_000,
        ))
        .await
        .unwrap();
    let dispatch = outcome.wait().await;

    assert!(dispatch.notified);
    assert!(dispatch.emailed);
    assert_eq!(harness.notifier.published().await.len(), 1);
    assert_eq!(harness.mailer.sent().await[0].to, "ada@example.com");
}

#[tokio::test]
async fn test_stored_ticket_goes_stale_after_threshold() {
    let harness = TestHarness::new();
    let processor = harness.processor();
    let created = 1_700_000_000;

    processor
        .process(&fixtures::ticket_message("Ticket-old", "ada@example.com", created))
        .await
        .unwrap()
        .wait()
        .await;
    processor
        .process(&fixtures::ticket_message(
            "Ticket-new",
            "grace@example.com",
            created + 6 * DAY,
        ))
        .await
        .unwrap()
        .wait()
        .await;

    let sweeper = harness.sweeper();
    let now = Utc.timestamp_opt(created + 8 * DAY, 0).unwrap();
    let report = sweeper.run(now).await;

    assert!(report.completed);
    assert_eq!(report.requesters_scanned, 2);
    assert_eq!(report.stale_count(), 1);
    assert_eq!(report.events[0].ticket_id, "Ticket-old");
    assert_eq!(report.events[0].age_days, 8);

    let ada = harness.store.get("ada@example.com").unwrap().unwrap();
    assert_eq!(ada.tickets[0].status, TicketStatus::Stale);
    let grace = harness.store.get("grace@example.com").unwrap().unwrap();
    assert_eq!(grace.tickets[0].status, TicketStatus::Open);

    // Two intake notifications plus one stale alert.
    assert_eq!(harness.notifier.published().await.len(), 3);
}

#[tokio::test]
async fn test_new_ticket_after_sweep_keeps_stale_history() {
    let harness = TestHarness::new();
    let processor = harness.processor();
    let created = 1_700_000_000;

    processor
        .process_at(
            &fixtures::ticket_message("Ticket-old", "ada@example.com", created),
            Utc.timestamp_opt(created, 0).unwrap(),
        )
        .await
        .unwrap();

    let report = harness
        .sweeper()
        .run(Utc.timestamp_opt(created + 10 * DAY, 0).unwrap())
        .await;
    assert_eq!(report.stale_count(), 1);

    processor
        .process(&fixtures::ticket_message(
            "Ticket-next",
            "ada@example.com",
            created + 10 * DAY,
        ))
        .await
        .unwrap();

    let ada = harness.store.get("ada@example.com").unwrap().unwrap();
    assert_eq!(ada.tickets.len(), 2);
    assert_eq!(ada.tickets[0].status, TicketStatus::Stale);
    assert_eq!(ada.tickets[1].status, TicketStatus::Open);
}
