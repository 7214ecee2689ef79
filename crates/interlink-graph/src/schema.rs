//! Neo4j schema initialization (uniqueness constraints).

use anyhow::Result;
use neo4rs::Query;
use tracing::info;

use crate::GraphClient;

/// Cypher statements for schema initialization.
///
/// Every node the writer MERGEs is keyed by `id`, so each label gets a
/// uniqueness constraint (which also backs the lookup index).
const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE CONSTRAINT vendor_user_id IF NOT EXISTS FOR (u:VendorUser) REQUIRE u.id IS UNIQUE",
    "CREATE CONSTRAINT b2c_customer_id IF NOT EXISTS FOR (c:B2CCustomer) REQUIRE c.id IS UNIQUE",
    "CREATE CONSTRAINT vendor_id IF NOT EXISTS FOR (v:Vendor) REQUIRE v.id IS UNIQUE",
    "CREATE CONSTRAINT product_id IF NOT EXISTS FOR (p:Product) REQUIRE p.id IS UNIQUE",
    "CREATE CONSTRAINT recipe_id IF NOT EXISTS FOR (r:Recipe) REQUIRE r.id IS UNIQUE",
];

/// Initialize Neo4j schema with constraints.
///
/// Safe to run multiple times - uses IF NOT EXISTS clauses.
pub async fn initialize_schema(client: &GraphClient) -> Result<usize> {
    info!("Initializing Neo4j schema...");

    for statement in SCHEMA_STATEMENTS {
        client.execute(Query::new(statement.to_string())).await?;
    }

    info!("Neo4j schema initialized ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(SCHEMA_STATEMENTS.len())
}
