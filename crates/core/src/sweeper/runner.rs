//! Staleness sweep over the whole requester store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{RecordPages, StaleEvent, SweepFailure, SweepReport};
use crate::config::SweeperConfig;
use crate::metrics::{STALE_TICKETS_FLAGGED, SWEEP_DURATION, SWEEP_FAILURES};
use crate::notify::{deliver_best_effort, Notifier};
use crate::store::{RequesterRecord, RequesterStore, StoreError, MAX_WRITE_ATTEMPTS};
use crate::ticket::{StoredTicket, TicketStatus};

/// Subject of the notification listing newly stale tickets.
pub const STALE_ALERT_SUBJECT: &str = "Stale Ticket Alert";

const SECS_PER_DAY: i64 = 86_400;

/// Flips OPEN tickets older than the threshold to STALE.
#[derive(Clone)]
pub struct StalenessSweeper {
    store: Arc<dyn RequesterStore>,
    notifier: Arc<dyn Notifier>,
    config: SweeperConfig,
    send_timeout: Duration,
}

impl StalenessSweeper {
    pub fn new(
        store: Arc<dyn RequesterStore>,
        notifier: Arc<dyn Notifier>,
        config: SweeperConfig,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            send_timeout,
        }
    }

    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Sweep the whole store.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        self.sweep_from(now, None)
    }

    /// Sweep starting after `cursor` (a previous report's checkpoint).
    ///
    /// A requester whose write-back fails is recorded and skipped. A failed page
    /// read ends the sweep early; the checkpoint then points at the last page
    /// that was read successfully.
    pub fn sweep_from(&self, now: DateTime<Utc>, cursor: Option<String>) -> SweepReport {
        let started = Instant::now();
        let now_ts = now.timestamp();
        let mut report = SweepReport::default();
        let mut pages = RecordPages::resume(self.store.as_ref(), self.config.page_size, cursor);

        for page in pages.by_ref() {
            let records = match page {
                Ok(records) => records,
                Err(e) => {
                    error!("Stale sweep page read failed: {}", e);
                    SWEEP_FAILURES.inc();
                    report.failures.push(SweepFailure {
                        email: None,
                        error: e.to_string(),
                    });
                    break;
                }
            };

            for record in records {
                report.requesters_scanned += 1;
                let email = record.email.clone();
                match self.sweep_requester(record, now_ts) {
                    Ok(events) => {
                        STALE_TICKETS_FLAGGED.inc_by(events.len() as u64);
                        report.events.extend(events);
                    }
                    Err(e) => {
                        error!("Stale sweep failed for {}: {}", email, e);
                        SWEEP_FAILURES.inc();
                        report.failures.push(SweepFailure {
                            email: Some(email),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        report.completed = report.failures.iter().all(|f| f.email.is_some());
        report.checkpoint = pages.cursor().map(str::to_string);

        SWEEP_DURATION.observe(started.elapsed().as_secs_f64());
        info!(
            "Stale sweep scanned {} requester(s): {} ticket(s) flagged, {} failure(s)",
            report.requesters_scanned,
            report.events.len(),
            report.failures.len()
        );
        report
    }

    /// Write back one requester's list if any ticket went stale, re-reading
    /// and re-evaluating on a concurrent update.
    fn sweep_requester(
        &self,
        mut record: RequesterRecord,
        now_ts: i64,
    ) -> Result<Vec<StaleEvent>, StoreError> {
        let mut attempt = 1;
        loop {
            let (tickets, events) =
                mark_stale(&record.email, &record.tickets, now_ts, self.config.stale_after_secs);
            if events.is_empty() {
                return Ok(events);
            }

            match self
                .store
                .replace_tickets(&record.email, &tickets, record.version)
            {
                Ok(_) => {
                    debug!("Marked {} ticket(s) stale for {}", events.len(), record.email);
                    return Ok(events);
                }
                Err(e) if e.is_conflict() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(
                        "Concurrent update on {} during sweep (attempt {}), re-reading",
                        record.email, attempt
                    );
                    attempt += 1;
                    record = self
                        .store
                        .get(&record.email)?
                        .ok_or_else(|| StoreError::NotFound(record.email.clone()))?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sweep, then publish one alert listing every newly stale ticket.
    ///
    /// The alert is best-effort and only sent when something went stale.
    pub async fn run(&self, now: DateTime<Utc>) -> SweepReport {
        let sweeper = self.clone();
        let report = match tokio::task::spawn_blocking(move || sweeper.sweep(now)).await {
            Ok(report) => report,
            Err(e) => {
                error!("Stale sweep task failed: {}", e);
                SWEEP_FAILURES.inc();
                SweepReport {
                    failures: vec![SweepFailure {
                        email: None,
                        error: format!("sweep task failed: {}", e),
                    }],
                    ..Default::default()
                }
            }
        };

        if report.events.is_empty() {
            return report;
        }

        match serde_json::to_string(&report.events) {
            Ok(body) => {
                let notifier = Arc::clone(&self.notifier);
                deliver_best_effort("stale_alert", self.send_timeout, async move {
                    notifier.publish(STALE_ALERT_SUBJECT, &body).await
                })
                .await;
            }
            Err(e) => error!("Failed to serialize stale events: {}", e),
        }

        report
    }

    /// Run the sweep every `interval_secs` until `shutdown` fires.
    pub fn spawn_schedule(&self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let sweeper = self.clone();
        let interval = Duration::from_secs(self.config.interval_secs.max(1));

        tokio::spawn(async move {
            info!("Stale sweep schedule started (every {}s)", interval.as_secs());
            loop {
                tokio::select! {
                    _ = shutdown.recv() => {
                        info!("Stale sweep schedule received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        let report = sweeper.run(Utc::now()).await;
                        debug!("Scheduled sweep: {}", report.summary());
                    }
                }
            }
            info!("Stale sweep schedule stopped");
        })
    }
}

/// Copy of `tickets` with every overdue OPEN ticket set to STALE, plus one
/// event per flipped ticket. Tickets without a creation time (absent or 0)
/// are left alone.
pub fn mark_stale(
    email: &str,
    tickets: &[StoredTicket],
    now_ts: i64,
    stale_after_secs: i64,
) -> (Vec<StoredTicket>, Vec<StaleEvent>) {
    let mut updated = tickets.to_vec();
    let mut events = Vec::new();

    for ticket in updated.iter_mut() {
        if ticket.status != TicketStatus::Open {
            continue;
        }
        let Some(created_at) = ticket.created_at.filter(|&c| c != 0) else {
            continue;
        };
        let age = now_ts - created_at;
        if age <= stale_after_secs {
            continue;
        }

        ticket.status = TicketStatus::Stale;
        events.push(StaleEvent {
            ticket_id: ticket.ticket_id.clone(),
            ticket_title: ticket.ticket_title.clone(),
            email: email.to_string(),
            age_days: age.div_euclid(SECS_PER_DAY),
            created_at,
        });
    }

    (updated, events)
}
