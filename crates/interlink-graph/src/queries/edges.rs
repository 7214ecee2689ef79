//! Subject edge inspection.
//!
//! Lists the edges currently leaving a subject node, for comparing the graph
//! against what a resync would write.

use anyhow::Result;
use neo4rs::Query;
use serde::Serialize;

use crate::GraphClient;

/// One outgoing edge of a subject.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectEdge {
    pub kind: String,
    pub target_label: String,
    pub target_id: String,
    pub count: Option<i64>,
}

/// List the edges leaving `(label {id})`, grouped by kind.
pub async fn subject_edges(client: &GraphClient, label: &str, id: &str) -> Result<Vec<SubjectEdge>> {
    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        anyhow::bail!("invalid label '{}'", label);
    }

    let query = Query::new(format!(
        "MATCH (s:{} {{id: $id}})-[r]->(t)
         RETURN type(r) as kind, labels(t)[0] as target_label, t.id as target_id,
                r.count as count
         ORDER BY kind, target_id
         LIMIT 500",
        label
    ))
    .param("id", id);

    let rows = client.query(query).await?;
    let edges = rows
        .into_iter()
        .map(|row| SubjectEdge {
            kind: row.get("kind").unwrap_or_default(),
            target_label: row.get("target_label").unwrap_or_default(),
            target_id: row.get("target_id").unwrap_or_default(),
            count: row.get("count").ok(),
        })
        .collect();

    Ok(edges)
}
