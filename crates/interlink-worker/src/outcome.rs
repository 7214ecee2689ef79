//! Per-event results and the outbox bookkeeping they imply.

use serde::Serialize;

use interlink_core::SyncResult;

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EventOutcome {
    /// The subject's managed edges were replaced.
    Synced { edges: usize },
    /// The subject is gone at the source and was removed from the graph.
    Deleted,
    /// The subject is missing for a non-delete op; nothing was written.
    SkippedMissingSubject,
    /// No pipeline handles the event's domain tag.
    Unrouted,
}

/// Outbox update decided from an event result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    MarkProcessed,
    MarkFailed(String),
    /// Leave the row claimed; it becomes eligible again when its lease lapses.
    Leave,
}

impl Disposition {
    pub fn for_result(result: &SyncResult<EventOutcome>) -> Self {
        match result {
            Ok(EventOutcome::Synced { .. }) | Ok(EventOutcome::Deleted) => Self::MarkProcessed,
            Ok(EventOutcome::SkippedMissingSubject) | Ok(EventOutcome::Unrouted) => Self::Leave,
            Err(e) => Self::MarkFailed(e.to_string()),
        }
    }
}

/// Tally of one polling cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub claimed: usize,
    pub released: u64,
    pub synced: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub unrouted: usize,
    pub failed: usize,
    /// Status updates that could not be written back.
    pub bookkeeping_errors: usize,
}

impl BatchReport {
    pub fn record(&mut self, result: &SyncResult<EventOutcome>) {
        match result {
            Ok(EventOutcome::Synced { .. }) => self.synced += 1,
            Ok(EventOutcome::Deleted) => self.deleted += 1,
            Ok(EventOutcome::SkippedMissingSubject) => self.skipped += 1,
            Ok(EventOutcome::Unrouted) => self.unrouted += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Add another cycle's counts into this one.
    pub fn absorb(&mut self, other: &BatchReport) {
        self.claimed += other.claimed;
        self.released += other.released;
        self.synced += other.synced;
        self.deleted += other.deleted;
        self.skipped += other.skipped;
        self.unrouted += other.unrouted;
        self.failed += other.failed;
        self.bookkeeping_errors += other.bookkeeping_errors;
    }

    pub fn processed(&self) -> usize {
        self.synced + self.deleted
    }

    pub fn is_idle(&self) -> bool {
        self.claimed == 0
    }
}
