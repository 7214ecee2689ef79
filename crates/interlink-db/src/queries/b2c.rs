//! B2C interaction loaders.

use async_trait::async_trait;

use interlink_core::b2c::model::{
    B2cInteractions, CustomerRow, ProductInteractionRow, RecipeHistoryRow, RecipeRatingRow,
    SavedRecipeRow,
};
use interlink_core::{B2cSource, SyncResult};

use crate::pool::{DbError, DbPool, DbResult};

type Ts = chrono::DateTime<chrono::Utc>;

#[derive(sqlx::FromRow)]
struct CustomerRecord {
    id: String,
    email: Option<String>,
    full_name: Option<String>,
    updated_at: Option<Ts>,
}

#[derive(sqlx::FromRow)]
struct HistoryRecord {
    recipe_id: String,
    event_type: String,
    event_at: Option<Ts>,
}

#[derive(sqlx::FromRow)]
struct SavedRecord {
    recipe_id: String,
    saved_at: Option<Ts>,
}

#[derive(sqlx::FromRow)]
struct RatingRecord {
    recipe_id: String,
    rating: Option<f64>,
    created_at: Option<Ts>,
}

#[derive(sqlx::FromRow)]
struct InteractionRecord {
    product_id: String,
    interaction_type: String,
    rating: Option<f64>,
    quantity: Option<i64>,
    price_paid: Option<f64>,
    interaction_timestamp: Option<Ts>,
}

/// Get a B2C customer by ID.
pub async fn get_customer(pool: &DbPool, customer_id: &str) -> DbResult<Option<CustomerRow>> {
    let record = sqlx::query_as::<_, CustomerRecord>(
        "SELECT id::text AS id, email, full_name, updated_at::timestamptz AS updated_at
         FROM b2c_customers
         WHERE id::text = $1",
    )
    .bind(customer_id)
    .fetch_optional(pool)
    .await?;

    Ok(record.map(|r| CustomerRow {
        id: r.id,
        email: r.email,
        full_name: r.full_name,
        updated_at: r.updated_at,
    }))
}

/// Load every recipe and product interaction of a customer on one connection.
pub async fn load_interactions(pool: &DbPool, customer_id: &str) -> DbResult<B2cInteractions> {
    let mut conn = pool.acquire().await?;

    let history = sqlx::query_as::<_, HistoryRecord>(
        "SELECT recipe_id::text AS recipe_id, event_type::text AS event_type,
                event_at::timestamptz AS event_at
         FROM recipe_history
         WHERE user_id::text = $1 AND recipe_id IS NOT NULL",
    )
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;

    let saved = sqlx::query_as::<_, SavedRecord>(
        "SELECT recipe_id::text AS recipe_id, saved_at::timestamptz AS saved_at
         FROM saved_recipes
         WHERE user_id::text = $1 AND recipe_id IS NOT NULL",
    )
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;

    let ratings = sqlx::query_as::<_, RatingRecord>(
        "SELECT recipe_id::text AS recipe_id, rating::float8 AS rating,
                created_at::timestamptz AS created_at
         FROM recipe_ratings
         WHERE b2c_customer_id::text = $1 AND recipe_id IS NOT NULL",
    )
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;

    let products = sqlx::query_as::<_, InteractionRecord>(
        "SELECT product_id::text AS product_id, interaction_type::text AS interaction_type,
                rating::float8 AS rating, quantity::bigint AS quantity,
                price_paid::float8 AS price_paid,
                interaction_timestamp::timestamptz AS interaction_timestamp
         FROM customer_product_interactions
         WHERE b2c_customer_id::text = $1 AND product_id IS NOT NULL",
    )
    .bind(customer_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(B2cInteractions {
        history: history
            .into_iter()
            .map(|r| RecipeHistoryRow {
                recipe_id: r.recipe_id,
                event_type: r.event_type,
                event_at: r.event_at,
            })
            .collect(),
        saved: saved
            .into_iter()
            .map(|r| SavedRecipeRow {
                recipe_id: r.recipe_id,
                saved_at: r.saved_at,
            })
            .collect(),
        ratings: ratings
            .into_iter()
            .map(|r| RecipeRatingRow {
                recipe_id: r.recipe_id,
                rating: r.rating,
                created_at: r.created_at,
            })
            .collect(),
        products: products
            .into_iter()
            .map(|r| ProductInteractionRow {
                product_id: r.product_id,
                interaction_type: r.interaction_type,
                rating: r.rating,
                quantity: r.quantity,
                price_paid: r.price_paid,
                interaction_timestamp: r.interaction_timestamp,
            })
            .collect(),
    })
}

/// [`B2cSource`] reading the customer tables.
#[derive(Clone)]
pub struct PgB2cSource {
    pool: DbPool,
}

impl PgB2cSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl B2cSource for PgB2cSource {
    async fn load_customer(&self, customer_id: &str) -> SyncResult<Option<CustomerRow>> {
        get_customer(&self.pool, customer_id).await.map_err(DbError::into_source)
    }

    async fn load_interactions(&self, customer_id: &str) -> SyncResult<B2cInteractions> {
        load_interactions(&self.pool, customer_id).await.map_err(DbError::into_source)
    }
}
