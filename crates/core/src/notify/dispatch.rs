//! Best-effort delivery of side-channel messages.
//!
//! A failed or slow delivery is logged and counted, never returned to the
//! caller: it must not undo or fail the work that triggered it.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::NotifyError;
use crate::metrics::SIDE_EFFECT_FAILURES;

/// Await `delivery` for at most `timeout`. Returns true if it succeeded.
pub async fn deliver_best_effort<F>(label: &'static str, timeout: Duration, delivery: F) -> bool
where
    F: Future<Output = Result<String, NotifyError>>,
{
    let result = match tokio::time::timeout(timeout, delivery).await {
        Ok(result) => result,
        Err(_) => Err(NotifyError::Timeout(timeout.as_secs())),
    };

    match result {
        Ok(message_id) => {
            debug!("{} delivered ({})", label, message_id);
            true
        }
        Err(e) => {
            error!("{} delivery failed: {}", label, e);
            SIDE_EFFECT_FAILURES.with_label_values(&[label]).inc();
            false
        }
    }
}

/// Run [`deliver_best_effort`] on its own task.
///
/// The returned handle may be awaited or dropped; dropping it does not cancel
/// the delivery.
pub fn spawn_best_effort<F>(label: &'static str, timeout: Duration, delivery: F) -> JoinHandle<bool>
where
    F: Future<Output = Result<String, NotifyError>> + Send + 'static,
{
    tokio::spawn(deliver_best_effort(label, timeout, delivery))
}
