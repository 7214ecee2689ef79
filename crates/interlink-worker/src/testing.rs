//! In-memory stores for worker tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use interlink_core::b2b::model::{B2bInteractions, VendorUserRow};
use interlink_core::b2c::model::{B2cInteractions, CustomerRow, ProductInteractionRow};
use interlink_core::config::DEFAULT_WATCHED_TABLES;
use interlink_core::{
    B2bSource, B2cSource, ClaimRequest, Domain, EventOp, EventStatus, ExhaustedEvent, OutboxEvent,
    OutboxStore, SyncError, SyncResult,
};

#[derive(Default)]
struct FixtureData {
    vendor_users: HashMap<String, VendorUserRow>,
    b2b: HashMap<String, B2bInteractions>,
    customers: HashMap<String, CustomerRow>,
    b2c: HashMap<String, B2cInteractions>,
    fail_loads: bool,
}

/// Source tables held in memory. Clones share state.
#[derive(Clone, Default)]
pub struct Fixtures {
    data: Arc<Mutex<FixtureData>>,
}

impl Fixtures {
    pub fn with_vendor_user(self, id: &str, vendor_id: &str) -> Self {
        self.data.lock().unwrap().vendor_users.insert(
            id.to_string(),
            VendorUserRow {
                id: id.to_string(),
                email: Some(format!("{}@vendor.test", id)),
                role: Some("buyer".to_string()),
                updated_at: None,
                vendor_id: vendor_id.to_string(),
                vendor_name: None,
            },
        );
        self
    }

    pub fn with_customer(self, id: &str) -> Self {
        self.data.lock().unwrap().customers.insert(
            id.to_string(),
            CustomerRow {
                id: id.to_string(),
                email: Some(format!("{}@shop.test", id)),
                full_name: None,
                updated_at: None,
            },
        );
        self
    }

    pub fn with_product_rows(self, customer_id: &str, rows: Vec<ProductInteractionRow>) -> Self {
        self.data
            .lock()
            .unwrap()
            .b2c
            .entry(customer_id.to_string())
            .or_default()
            .products
            .extend(rows);
        self
    }

    pub fn failing_loads(self) -> Self {
        self.data.lock().unwrap().fail_loads = true;
        self
    }

    pub fn remove_customer(&self, id: &str) {
        let mut data = self.data.lock().unwrap();
        data.customers.remove(id);
        data.b2c.remove(id);
    }
}

#[async_trait]
impl B2bSource for Fixtures {
    async fn load_vendor_user(&self, user_id: &str) -> SyncResult<Option<VendorUserRow>> {
        Ok(self.data.lock().unwrap().vendor_users.get(user_id).cloned())
    }

    async fn load_interactions(&self, user_id: &str) -> SyncResult<B2bInteractions> {
        let data = self.data.lock().unwrap();
        if data.fail_loads {
            return Err(SyncError::source("connection reset"));
        }
        Ok(data.b2b.get(user_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl B2cSource for Fixtures {
    async fn load_customer(&self, customer_id: &str) -> SyncResult<Option<CustomerRow>> {
        Ok(self.data.lock().unwrap().customers.get(customer_id).cloned())
    }

    async fn load_interactions(&self, customer_id: &str) -> SyncResult<B2cInteractions> {
        let data = self.data.lock().unwrap();
        if data.fail_loads {
            return Err(SyncError::source("connection reset"));
        }
        Ok(data.b2c.get(customer_id).cloned().unwrap_or_default())
    }
}

pub fn product_row(product_id: &str, interaction_type: &str) -> ProductInteractionRow {
    ProductInteractionRow {
        product_id: product_id.to_string(),
        interaction_type: interaction_type.to_string(),
        rating: None,
        quantity: None,
        price_paid: None,
        interaction_timestamp: None,
    }
}

/// One outbox row with its bookkeeping columns.
#[derive(Debug, Clone)]
pub struct OutboxRecord {
    pub event: OutboxEvent,
    pub status: EventStatus,
    pub last_error: Option<String>,
    claimed_at: Option<Instant>,
}

/// `graph_outbox` held in memory.
#[derive(Default)]
pub struct MemoryOutbox {
    rows: Mutex<BTreeMap<i64, OutboxRecord>>,
}

impl MemoryOutbox {
    pub fn push(&self, id: i64, domain: Domain, aggregate_id: &str, op: EventOp) {
        let table = match domain {
            Domain::B2c => "customer_product_interactions",
            Domain::B2b => "vendor_user_actions",
        };
        self.insert(id, domain.tag(), table, aggregate_id, op);
    }

    pub fn push_tagged(&self, id: i64, tag: &str, aggregate_id: &str, op: EventOp) {
        self.insert(id, tag, DEFAULT_WATCHED_TABLES[3], aggregate_id, op);
    }

    fn insert(&self, id: i64, tag: &str, source_table: &str, aggregate_id: &str, op: EventOp) {
        let event = OutboxEvent {
            id,
            aggregate_type: tag.to_string(),
            aggregate_id: aggregate_id.to_string(),
            op,
            attempts: 0,
            source_table: source_table.to_string(),
        };
        self.rows.lock().unwrap().insert(
            id,
            OutboxRecord {
                event,
                status: EventStatus::Pending,
                last_error: None,
                claimed_at: None,
            },
        );
    }

    pub fn record(&self, id: i64) -> OutboxRecord {
        self.rows.lock().unwrap()[&id].clone()
    }

    fn update(&self, id: i64, f: impl FnOnce(&mut OutboxRecord)) -> SyncResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let record = rows
            .get_mut(&id)
            .ok_or_else(|| SyncError::outbox(format!("Not found: Outbox event: {}", id)))?;
        f(record);
        Ok(())
    }

    fn exhausted(&self, max_attempts: i32) -> Vec<OutboxRecord> {
        self.rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| matches!(r.status, EventStatus::Pending | EventStatus::Failed))
            .filter(|r| r.event.attempts >= max_attempts)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OutboxStore for MemoryOutbox {
    async fn release_stale(&self, lease: Duration) -> SyncResult<u64> {
        let mut released = 0;
        for record in self.rows.lock().unwrap().values_mut() {
            let lapsed = record.claimed_at.is_some_and(|at| at.elapsed() >= lease);
            if record.status == EventStatus::Processing && lapsed {
                record.status = EventStatus::Pending;
                record.claimed_at = None;
                released += 1;
            }
        }
        Ok(released)
    }

    async fn claim(&self, request: &ClaimRequest) -> SyncResult<Vec<OutboxEvent>> {
        let mut rows = self.rows.lock().unwrap();
        let claimed: Vec<OutboxEvent> = rows
            .values_mut()
            .filter(|r| matches!(r.status, EventStatus::Pending | EventStatus::Failed))
            .filter(|r| r.event.attempts < request.max_attempts)
            .filter(|r| request.source_tables.contains(&r.event.source_table))
            .filter(|r| request.aggregate_types.contains(&r.event.aggregate_type))
            .take(request.batch_size as usize)
            .map(|r| {
                r.status = EventStatus::Processing;
                r.claimed_at = Some(Instant::now());
                r.event.clone()
            })
            .collect();
        Ok(claimed)
    }

    async fn mark_processed(&self, event_id: i64) -> SyncResult<()> {
        self.update(event_id, |r| {
            r.status = EventStatus::Processed;
            r.last_error = None;
            r.claimed_at = None;
        })
    }

    async fn mark_failed(&self, event_id: i64, error: &str) -> SyncResult<()> {
        self.update(event_id, |r| {
            r.status = EventStatus::Failed;
            r.event.attempts += 1;
            r.last_error = Some(error.to_string());
            r.claimed_at = None;
        })
    }

    async fn count_exhausted(&self, max_attempts: i32) -> SyncResult<i64> {
        Ok(self.exhausted(max_attempts).len() as i64)
    }

    async fn list_exhausted(&self, max_attempts: i32, limit: i64) -> SyncResult<Vec<ExhaustedEvent>> {
        Ok(self
            .exhausted(max_attempts)
            .into_iter()
            .take(limit as usize)
            .map(|r| ExhaustedEvent { event: r.event, last_error: r.last_error })
            .collect())
    }
}
