//! Interlink Database Layer
//!
//! PostgreSQL access for the sync worker: the `graph_outbox` queue and
//! read-only loaders for the B2B and B2C interaction tables.

pub mod pool;
pub mod queries;

pub use pool::{DbError, DbPool, DbResult, init_pool};
pub use queries::b2b::PgB2bSource;
pub use queries::b2c::PgB2cSource;
pub use queries::outbox::PgOutboxStore;

