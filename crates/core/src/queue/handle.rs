use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::intake::TicketMessage;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue {0} is full")]
    Full(String),

    #[error("Queue {0} is closed")]
    Closed(String),
}

/// Envelope wrapping a ticket message with delivery metadata
#[derive(Debug, Clone)]
pub struct QueuedMessage {
    pub enqueued_at: DateTime<Utc>,
    /// 1 on first delivery, incremented on each redelivery.
    pub delivery: u32,
    pub message: TicketMessage,
}

impl QueuedMessage {
    pub fn new(message: TicketMessage) -> Self {
        Self {
            enqueued_at: Utc::now(),
            delivery: 1,
            message,
        }
    }

    /// The same message scheduled for its next delivery.
    pub fn redelivered(&self) -> Self {
        Self {
            enqueued_at: self.enqueued_at,
            delivery: self.delivery + 1,
            message: self.message.clone(),
        }
    }
}

/// Handle for submitting ticket messages
///
/// This is cheaply cloneable and can be shared across tasks.
/// Messages are sent through a bounded channel to be processed by the IntakeConsumer.
#[derive(Clone)]
pub struct IntakeQueue {
    name: String,
    tx: mpsc::Sender<QueuedMessage>,
}

impl IntakeQueue {
    /// Create a new queue handle from a channel sender
    pub fn new(name: impl Into<String>, tx: mpsc::Sender<QueuedMessage>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue a message without waiting for buffer space.
    ///
    /// A full or closed queue is reported to the caller; nothing is retried here.
    pub fn enqueue(&self, message: TicketMessage) -> Result<(), QueueError> {
        match self.tx.try_send(QueuedMessage::new(message)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(rejected)) => {
                tracing::warn!(
                    "Queue {} full, rejecting ticket {}",
                    self.name,
                    rejected.message.ticket_id
                );
                Err(QueueError::Full(self.name.clone()))
            }
            Err(mpsc::error::TrySendError::Closed(rejected)) => {
                tracing::error!(
                    "Queue {} closed, rejecting ticket {}",
                    self.name,
                    rejected.message.ticket_id
                );
                Err(QueueError::Closed(self.name.clone()))
            }
        }
    }

    /// Whether the consumer side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::ticket_message;

    #[test]
    fn test_enqueue_wraps_first_delivery() {
        let (tx, mut rx) = mpsc::channel(10);
        let queue = IntakeQueue::new("tickets", tx);

        let before = Utc::now();
        queue.enqueue(ticket_message("T-1", "a@b.co", 1)).unwrap();

        let queued = rx.try_recv().expect("Should receive message");
        assert_eq!(queued.delivery, 1);
        assert_eq!(queued.message.ticket_id, "T-1");
        assert!(queued.enqueued_at >= before);
    }

    #[test]
    fn test_enqueue_full_queue() {
        let (tx, _rx) = mpsc::channel(1);
        let queue = IntakeQueue::new("tickets", tx);

        assert!(queue.enqueue(ticket_message("T-1", "a@b.co", 1)).is_ok());
        assert_eq!(
            queue.enqueue(ticket_message("T-2", "a@b.co", 1)),
            Err(QueueError::Full("tickets".to_string()))
        );
    }

    #[test]
    fn test_enqueue_closed_queue() {
        let (tx, rx) = mpsc::channel::<QueuedMessage>(10);
        let queue = IntakeQueue::new("tickets", tx);
        drop(rx);

        assert!(queue.is_closed());
        assert_eq!(
            queue.enqueue(ticket_message("T-1", "a@b.co", 1)),
            Err(QueueError::Closed("tickets".to_string()))
        );
    }

    #[test]
    fn test_redelivered_increments_delivery() {
        let queued = QueuedMessage::new(ticket_message("T-1", "a@b.co", 1));
        let again = queued.redelivered();
        assert_eq!(again.delivery, 2);
        assert_eq!(again.enqueued_at, queued.enqueued_at);
        assert_eq!(again.message, queued.message);
    }
}
