//! B2B interaction loaders.

use async_trait::async_trait;

use interlink_core::b2b::model::{
    B2bInteractions, MatchFeedbackRow, ProductActionRow, VendorUserRow,
};
use interlink_core::{B2bSource, SyncResult};

use crate::pool::{DbError, DbPool, DbResult};

#[derive(sqlx::FromRow)]
struct VendorUserRecord {
    id: String,
    email: Option<String>,
    role: Option<String>,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
    vendor_id: String,
    vendor_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ProductActionRecord {
    product_id: String,
    action_type: String,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(sqlx::FromRow)]
struct MatchFeedbackRecord {
    source_product_id: String,
    target_product_id: String,
    feedback_type: String,
    reason: Option<String>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Get a vendor user joined with its vendor.
pub async fn get_vendor_user(pool: &DbPool, user_id: &str) -> DbResult<Option<VendorUserRow>> {
    let record = sqlx::query_as::<_, VendorUserRecord>(
        "SELECT vu.id::text AS id, vu.email, vu.role::text AS role,
                vu.updated_at::timestamptz AS updated_at,
                v.id::text AS vendor_id, v.name AS vendor_name
         FROM vendor_users vu
         JOIN vendors v ON v.id = vu.vendor_id
         WHERE vu.id::text = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record.map(|r| VendorUserRow {
        id: r.id,
        email: r.email,
        role: r.role,
        updated_at: r.updated_at,
        vendor_id: r.vendor_id,
        vendor_name: r.vendor_name,
    }))
}

/// Load a vendor user's product actions and match feedback on one connection.
pub async fn load_interactions(pool: &DbPool, user_id: &str) -> DbResult<B2bInteractions> {
    let mut conn = pool.acquire().await?;

    let actions = sqlx::query_as::<_, ProductActionRecord>(
        "SELECT product_id::text AS product_id, action_type::text AS action_type,
                created_at::timestamptz AS created_at
         FROM vendor_user_actions
         WHERE vendor_user_id::text = $1 AND product_id IS NOT NULL",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let feedback = sqlx::query_as::<_, MatchFeedbackRecord>(
        "SELECT source_product_id::text AS source_product_id,
                target_product_id::text AS target_product_id,
                feedback_type::text AS feedback_type, reason,
                created_at::timestamptz AS created_at
         FROM match_feedback
         WHERE vendor_user_id::text = $1",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(B2bInteractions {
        actions: actions
            .into_iter()
            .map(|r| ProductActionRow {
                product_id: r.product_id,
                action_type: r.action_type,
                created_at: r.created_at,
            })
            .collect(),
        feedback: feedback
            .into_iter()
            .map(|r| MatchFeedbackRow {
                source_product_id: r.source_product_id,
                target_product_id: r.target_product_id,
                feedback_type: r.feedback_type,
                reason: r.reason,
                created_at: r.created_at,
            })
            .collect(),
    })
}

/// [`B2bSource`] reading the vendor tables.
#[derive(Clone)]
pub struct PgB2bSource {
    pool: DbPool,
}

impl PgB2bSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl B2bSource for PgB2bSource {
    async fn load_vendor_user(&self, user_id: &str) -> SyncResult<Option<VendorUserRow>> {
        get_vendor_user(&self.pool, user_id).await.map_err(DbError::into_source)
    }

    async fn load_interactions(&self, user_id: &str) -> SyncResult<B2bInteractions> {
        load_interactions(&self.pool, user_id).await.map_err(DbError::into_source)
    }
}
