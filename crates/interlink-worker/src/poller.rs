//! Outbox polling loop.
//!
//! Each cycle returns lapsed claims to the queue, claims a batch and handles
//! its events one at a time. A failing event is recorded against its own row
//! and never aborts the rest of the batch.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

use interlink_core::{ClaimRequest, OutboxEvent, OutboxStore, Settings, SyncResult};

use crate::outcome::{BatchReport, Disposition, EventOutcome};
use crate::router::Router;

pub struct Worker {
    outbox: Arc<dyn OutboxStore>,
    router: Router,
    claim: ClaimRequest,
    poll_interval: Duration,
    claim_lease: Duration,
}

impl Worker {
    pub fn new(outbox: Arc<dyn OutboxStore>, router: Router, settings: &Settings) -> Self {
        Self {
            outbox,
            router,
            claim: settings.claim_request(),
            poll_interval: settings.poll_interval(),
            claim_lease: settings.claim_lease(),
        }
    }

    /// Run a single polling cycle.
    pub async fn run_once(&self) -> SyncResult<BatchReport> {
        let released = self.outbox.release_stale(self.claim_lease).await?;
        if released > 0 {
            info!(released, "Returned events with lapsed claims to the queue");
        }

        let events = self.outbox.claim(&self.claim).await?;
        let mut report = BatchReport {
            claimed: events.len(),
            released,
            ..Default::default()
        };

        for event in &events {
            let result = self.router.dispatch(event).await;
            report.record(&result);
            if let Err(e) = self.settle(event, &result).await {
                // The claim lease returns the row to the queue later.
                error!(event_id = event.id, error = %e, "Failed to update outbox status");
                report.bookkeeping_errors += 1;
            }
        }

        Ok(report)
    }

    async fn settle(&self, event: &OutboxEvent, result: &SyncResult<EventOutcome>) -> SyncResult<()> {
        match Disposition::for_result(result) {
            Disposition::MarkProcessed => self.outbox.mark_processed(event.id).await,
            Disposition::MarkFailed(reason) => {
                warn!(
                    event_id = event.id,
                    aggregate_type = %event.aggregate_type,
                    aggregate_id = %event.aggregate_id,
                    attempt = event.attempts + 1,
                    error = %reason,
                    "Outbox event failed"
                );
                self.outbox.mark_failed(event.id, &reason).await
            }
            Disposition::Leave => Ok(()),
        }
    }

    /// Process batches until the queue is empty or a batch makes no progress.
    pub async fn drain(&self) -> SyncResult<BatchReport> {
        let mut total = BatchReport::default();
        loop {
            let report = self.run_once().await?;
            let progressed = report.processed() > 0;
            total.absorb(&report);
            if report.is_idle() || !progressed {
                return Ok(total);
            }
        }
    }

    /// Poll until `shutdown` flips to `true`.
    ///
    /// Shutdown is only observed between batches, so an in-flight event always
    /// finishes its graph write and status update.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            batch_size = self.claim.batch_size,
            max_attempts = self.claim.max_attempts,
            poll_interval_secs = self.poll_interval.as_secs(),
            "Outbox worker started"
        );

        let mut reported_exhausted = 0;
        while !*shutdown.borrow() {
            let idle = match self.run_once().await {
                Ok(report) if report.is_idle() => true,
                Ok(report) => {
                    info!(
                        claimed = report.claimed,
                        processed = report.processed(),
                        failed = report.failed,
                        skipped = report.skipped,
                        unrouted = report.unrouted,
                        "Processed outbox batch"
                    );
                    false
                }
                Err(e) => {
                    error!(error = %e, "Polling cycle failed");
                    true
                }
            };
            if !idle {
                continue;
            }

            self.report_exhausted(&mut reported_exhausted).await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Outbox worker stopped");
    }

    /// Warn when the number of events at the attempt ceiling changes.
    async fn report_exhausted(&self, last: &mut i64) {
        match self.outbox.count_exhausted(self.claim.max_attempts).await {
            Ok(count) if count != *last => {
                if count > 0 {
                    warn!(
                        exhausted = count,
                        max_attempts = self.claim.max_attempts,
                        "Outbox events exhausted their retries; inspect with `interlink outbox exhausted`"
                    );
                }
                *last = count;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to count exhausted outbox events"),
        }
    }
}
