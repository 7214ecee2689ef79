//! Neo4j-backed [`GraphStore`].

use async_trait::async_trait;
use tracing::debug;

use interlink_core::{GraphMutation, GraphStore, SyncError, SyncResult};

use crate::cypher;
use crate::GraphClient;

/// Applies each mutation as one Neo4j transaction.
#[derive(Clone)]
pub struct Neo4jStore {
    client: GraphClient,
}

impl Neo4jStore {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn apply(&self, mutation: &GraphMutation) -> SyncResult<()> {
        let statements = cypher::render(mutation)?;
        debug!(
            subject = mutation.subject_id(),
            label = mutation.subject_label(),
            statements = statements.len(),
            "Applying graph mutation"
        );

        let queries = statements.into_iter().map(cypher::Statement::into_query).collect();
        self.client
            .execute_atomic(queries)
            .await
            .map_err(|e| SyncError::graph(format!("{:#}", e)))
    }
}
