//! Store seams.
//!
//! The worker only talks to the relational and graph stores through these
//! traits, so each store client is constructed once and passed in explicitly.

use async_trait::async_trait;
use std::time::Duration;

use crate::b2b::model::{B2bInteractions, VendorUserRow};
use crate::b2c::model::{B2cInteractions, CustomerRow};
use crate::error::SyncResult;
use crate::event::{ClaimRequest, ExhaustedEvent, OutboxEvent};
use crate::mutation::GraphMutation;

/// Outbox queue operations.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Return claimed rows whose lease lapsed to the pending state.
    async fn release_stale(&self, lease: Duration) -> SyncResult<u64>;

    /// Claim up to `batch_size` eligible rows, hiding them from other workers.
    async fn claim(&self, request: &ClaimRequest) -> SyncResult<Vec<OutboxEvent>>;

    async fn mark_processed(&self, event_id: i64) -> SyncResult<()>;

    /// Record a failed attempt and its error text.
    async fn mark_failed(&self, event_id: i64, error: &str) -> SyncResult<()>;

    /// Count rows that reached the attempt ceiling.
    async fn count_exhausted(&self, max_attempts: i32) -> SyncResult<i64>;

    async fn list_exhausted(&self, max_attempts: i32, limit: i64) -> SyncResult<Vec<ExhaustedEvent>>;
}

/// Reads a vendor user's current state from the source tables.
#[async_trait]
pub trait B2bSource: Send + Sync {
    async fn load_vendor_user(&self, user_id: &str) -> SyncResult<Option<VendorUserRow>>;

    async fn load_interactions(&self, user_id: &str) -> SyncResult<B2bInteractions>;
}

/// Reads a customer's current state from the source tables.
#[async_trait]
pub trait B2cSource: Send + Sync {
    async fn load_customer(&self, customer_id: &str) -> SyncResult<Option<CustomerRow>>;

    async fn load_interactions(&self, customer_id: &str) -> SyncResult<B2cInteractions>;
}

/// Applies mutations atomically.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Apply one mutation. On error none of it is visible.
    async fn apply(&self, mutation: &GraphMutation) -> SyncResult<()>;
}
