use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::{IntakeQueue, QueuedMessage};
use crate::config::QueueConfig;
use crate::intake::{IntakeProcessor, TicketMessage};
use crate::metrics::{QUEUE_DEAD_LETTERS, QUEUE_REDELIVERIES};

/// Background task that drains the intake queue in batches
///
/// Delivery is at-least-once: a message that fails with a retryable error is
/// redelivered until it has been tried `max_deliveries` times, then dropped.
pub struct IntakeConsumer {
    name: String,
    rx: mpsc::Receiver<QueuedMessage>,
    redeliveries: VecDeque<QueuedMessage>,
    processor: Arc<IntakeProcessor>,
    batch_size: usize,
    max_deliveries: u32,
}

impl IntakeConsumer {
    pub fn new(
        name: impl Into<String>,
        rx: mpsc::Receiver<QueuedMessage>,
        processor: Arc<IntakeProcessor>,
        batch_size: usize,
        max_deliveries: u32,
    ) -> Self {
        Self {
            name: name.into(),
            rx,
            redeliveries: VecDeque::new(),
            processor,
            batch_size: batch_size.max(1),
            max_deliveries: max_deliveries.max(1),
        }
    }

    /// Run the consumer until every queue handle is dropped and no
    /// redelivery is pending
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        tracing::info!("Intake consumer for queue {} started", self.name);

        while let Some(batch) = self.next_batch().await {
            self.handle_batch(batch).await;
        }

        tracing::info!("Intake consumer for queue {} shutting down", self.name);
    }

    /// Pending redeliveries first, then whatever is already buffered, up to
    /// `batch_size`. Waits only when nothing at all is available.
    async fn next_batch(&mut self) -> Option<Vec<QueuedMessage>> {
        let mut batch = Vec::with_capacity(self.batch_size);

        while batch.len() < self.batch_size {
            match self.redeliveries.pop_front() {
                Some(queued) => batch.push(queued),
                None => break,
            }
        }

        if batch.is_empty() {
            batch.push(self.rx.recv().await?);
        }

        while batch.len() < self.batch_size {
            match self.rx.try_recv() {
                Ok(queued) => batch.push(queued),
                Err(_) => break,
            }
        }

        Some(batch)
    }

    async fn handle_batch(&mut self, batch: Vec<QueuedMessage>) {
        let messages: Vec<TicketMessage> = batch.iter().map(|q| q.message.clone()).collect();
        let report = self.processor.process_batch(&messages).await;

        tracing::debug!(
            "Queue {}: batch of {} processed, {} failed",
            self.name,
            batch.len(),
            report.failures.len()
        );

        for failure in report.failures {
            let queued = &batch[failure.index];
            if failure.error.is_retryable() && queued.delivery < self.max_deliveries {
                tracing::warn!(
                    "Redelivering ticket {} (delivery {} of {}): {}",
                    failure.ticket_id,
                    queued.delivery + 1,
                    self.max_deliveries,
                    failure.error
                );
                QUEUE_REDELIVERIES.inc();
                self.redeliveries.push_back(queued.redelivered());
            } else {
                tracing::error!(
                    "Dropping ticket {} after {} deliveries: {}",
                    failure.ticket_id,
                    queued.delivery,
                    failure.error
                );
                QUEUE_DEAD_LETTERS.inc();
            }
        }
    }
}

/// Create a complete intake queue
///
/// Returns:
/// - `IntakeQueue` - for submitting messages (clone this to share across tasks)
/// - `IntakeConsumer` - spawn this as a background task with `tokio::spawn(consumer.run())`
pub fn create_intake_queue(
    config: &QueueConfig,
    processor: Arc<IntakeProcessor>,
) -> (IntakeQueue, IntakeConsumer) {
    let (tx, rx) = mpsc::channel(config.buffer_size.max(1));
    let queue = IntakeQueue::new(config.name.clone(), tx);
    let consumer = IntakeConsumer::new(
        config.name.clone(),
        rx,
        processor,
        config.batch_size,
        config.max_deliveries,
    );
    (queue, consumer)
}
