//! `graph_outbox` queue queries.
//!
//! Claiming flips rows to `processing` inside a single
//! `FOR UPDATE SKIP LOCKED` statement, so two workers never hold the same row.
//! A row only leaves `processing` through `mark_processed`, `mark_failed` or
//! lease expiry in `release_stale`.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use interlink_core::{
    ClaimRequest, EventOp, ExhaustedEvent, OutboxEvent, OutboxStore, SyncError, SyncResult,
};

use crate::pool::{DbError, DbPool, DbResult};

/// Outbox row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutboxRow {
    pub id: i64,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub op: String,
    pub attempts: i32,
    pub source_table: String,
}

impl OutboxRow {
    /// Convert to a domain event, rejecting unknown ops.
    pub fn into_event(self) -> DbResult<OutboxEvent> {
        let op: EventOp = self.op.parse().map_err(DbError::InvalidRow)?;
        Ok(OutboxEvent {
            id: self.id,
            aggregate_type: self.aggregate_type,
            aggregate_id: self.aggregate_id,
            op,
            attempts: self.attempts,
            source_table: self.source_table,
        })
    }
}

/// Split claimed rows into usable events and rows with an unparseable op.
pub fn partition_claimed(rows: Vec<OutboxRow>) -> (Vec<OutboxEvent>, Vec<SyncError>) {
    let mut events = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    for row in rows {
        let event_id = row.id;
        match row.into_event() {
            Ok(event) => events.push(event),
            Err(e) => rejected.push(SyncError::InvalidEvent {
                event_id,
                reason: e.to_string(),
            }),
        }
    }
    (events, rejected)
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ExhaustedRow {
    #[sqlx(flatten)]
    row: OutboxRow,
    last_error: Option<String>,
}

/// Return lapsed `processing` rows to `pending`.
pub async fn release_stale(pool: &DbPool, lease: Duration) -> DbResult<u64> {
    let result = sqlx::query(
        "UPDATE graph_outbox
         SET status = 'pending', claimed_at = NULL
         WHERE status = 'processing'
           AND claimed_at < now() - make_interval(secs => $1::double precision)",
    )
    .bind(lease.as_secs_f64())
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Claim up to `batch_size` eligible rows, oldest first.
pub async fn claim_events(pool: &DbPool, request: &ClaimRequest) -> DbResult<Vec<OutboxRow>> {
    let mut rows = sqlx::query_as::<_, OutboxRow>(
        "WITH claimable AS (
             SELECT id
             FROM graph_outbox
             WHERE status IN ('pending', 'failed')
               AND attempts < $2
               AND source_table = ANY($3)
               AND aggregate_type = ANY($4)
             ORDER BY id
             LIMIT $1
             FOR UPDATE SKIP LOCKED
         )
         UPDATE graph_outbox o
         SET status = 'processing', claimed_at = now()
         FROM claimable c
         WHERE o.id = c.id
         RETURNING o.id, o.aggregate_type, o.aggregate_id::text AS aggregate_id,
                   o.op, o.attempts, o.source_table",
    )
    .bind(request.batch_size)
    .bind(request.max_attempts)
    .bind(request.source_tables.as_slice())
    .bind(request.aggregate_types.as_slice())
    .fetch_all(pool)
    .await?;

    // RETURNING does not preserve the CTE ordering.
    rows.sort_by_key(|r| r.id);
    Ok(rows)
}

pub async fn mark_processed(pool: &DbPool, event_id: i64) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE graph_outbox
         SET status = 'processed', processed_at = now(), claimed_at = NULL, last_error = NULL
         WHERE id = $1",
    )
    .bind(event_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("Outbox event: {}", event_id)));
    }
    Ok(())
}

/// Record a failed attempt. The row stays claimable while under the ceiling.
pub async fn mark_failed(pool: &DbPool, event_id: i64, error: &str) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE graph_outbox
         SET status = 'failed', attempts = attempts + 1, last_error = $2, claimed_at = NULL
         WHERE id = $1",
    )
    .bind(event_id)
    .bind(error)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(format!("Outbox event: {}", event_id)));
    }
    Ok(())
}

pub async fn count_exhausted(pool: &DbPool, max_attempts: i32) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT count(*)
         FROM graph_outbox
         WHERE status IN ('pending', 'failed') AND attempts >= $1",
    )
    .bind(max_attempts)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

pub async fn list_exhausted(
    pool: &DbPool,
    max_attempts: i32,
    limit: i64,
) -> DbResult<Vec<(OutboxRow, Option<String>)>> {
    let rows = sqlx::query_as::<_, ExhaustedRow>(
        "SELECT id, aggregate_type, aggregate_id::text AS aggregate_id, op, attempts,
                source_table, last_error
         FROM graph_outbox
         WHERE status IN ('pending', 'failed') AND attempts >= $1
         ORDER BY id
         LIMIT $2",
    )
    .bind(max_attempts)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| (r.row, r.last_error)).collect())
}

/// [`OutboxStore`] backed by the `graph_outbox` table.
#[derive(Clone)]
pub struct PgOutboxStore {
    pool: DbPool,
}

impl PgOutboxStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutboxStore for PgOutboxStore {
    async fn release_stale(&self, lease: Duration) -> SyncResult<u64> {
        release_stale(&self.pool, lease).await.map_err(DbError::into_outbox)
    }

    async fn claim(&self, request: &ClaimRequest) -> SyncResult<Vec<OutboxEvent>> {
        let rows = claim_events(&self.pool, request)
            .await
            .map_err(DbError::into_outbox)?;

        let (events, rejected) = partition_claimed(rows);
        for err in rejected {
            let SyncError::InvalidEvent { event_id, .. } = &err else {
                continue;
            };
            // Unparseable rows count as a failed attempt so they age out.
            warn!(event_id, error = %err, "Rejecting malformed outbox row");
            if let Err(e) = mark_failed(&self.pool, *event_id, &err.to_string()).await {
                // The row stays claimed until its lease lapses.
                warn!(event_id, error = %e, "Failed to record malformed outbox row");
            }
        }

        debug!(claimed = events.len(), "Claimed outbox events");
        Ok(events)
    }

    async fn mark_processed(&self, event_id: i64) -> SyncResult<()> {
        mark_processed(&self.pool, event_id).await.map_err(DbError::into_outbox)
    }

    async fn mark_failed(&self, event_id: i64, error: &str) -> SyncResult<()> {
        mark_failed(&self.pool, event_id, error).await.map_err(DbError::into_outbox)
    }

    async fn count_exhausted(&self, max_attempts: i32) -> SyncResult<i64> {
        count_exhausted(&self.pool, max_attempts).await.map_err(DbError::into_outbox)
    }

    async fn list_exhausted(&self, max_attempts: i32, limit: i64) -> SyncResult<Vec<ExhaustedEvent>> {
        let rows = list_exhausted(&self.pool, max_attempts, limit)
            .await
            .map_err(DbError::into_outbox)?;

        rows.into_iter()
            .map(|(row, last_error)| {
                let event = row.into_event().map_err(DbError::into_outbox)?;
                Ok(ExhaustedEvent { event, last_error })
            })
            .collect()
    }
}
