//! In-process [`GraphStore`].
//!
//! Applies mutations with the same delete-then-rebuild semantics as the Cypher
//! renderer. Used by tests to check convergence properties without Neo4j.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::Mutex;

use interlink_core::{GraphMutation, GraphStore, NodeUpsert, PropValue, Props, SyncError, SyncResult};

/// `(label, id)` of a node.
pub type NodeKey = (String, String);

/// A directed, kind-tagged edge. At most one exists per key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeKey {
    pub from: NodeKey,
    pub kind: String,
    pub to: NodeKey,
}

/// Full contents of the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphState {
    pub nodes: BTreeMap<NodeKey, Props>,
    pub edges: BTreeMap<EdgeKey, Props>,
}

impl GraphState {
    fn upsert_node(&mut self, node: &NodeUpsert) -> NodeKey {
        let key = (node.label.clone(), node.id.clone());
        let props = self.nodes.entry(key.clone()).or_default();
        for (name, value) in &node.props {
            match value {
                PropValue::Null => {
                    props.remove(name);
                }
                v => {
                    props.insert(name.clone(), v.clone());
                }
            }
        }
        key
    }

    fn apply(&mut self, mutation: &GraphMutation) {
        match mutation {
            GraphMutation::ReplaceSubject { subject, families } => {
                let from = self.upsert_node(subject);
                for family in families {
                    self.edges.retain(|edge, _| {
                        !(edge.from == from
                            && edge.to.0 == family.counterpart_label
                            && family.managed_kinds.contains(&edge.kind))
                    });
                    for node in &family.nodes {
                        self.upsert_node(node);
                    }
                    for edge in &family.edges {
                        let to = self.upsert_node(&NodeUpsert::new(&family.counterpart_label, &edge.target_id));
                        let props = self
                            .edges
                            .entry(EdgeKey { from: from.clone(), kind: edge.kind.clone(), to })
                            .or_default();
                        props.extend(edge.props.iter().map(|(k, v)| (k.clone(), v.clone())));
                    }
                }
            }
            GraphMutation::DetachSubject { label, id } => {
                let key = (label.clone(), id.clone());
                self.edges.retain(|edge, _| edge.from != key && edge.to != key);
                self.nodes.remove(&key);
            }
        }
    }

    /// Edges leaving `(label, id)` as `(kind, target id, props)`.
    pub fn edges_from(&self, label: &str, id: &str) -> Vec<(String, String, Props)> {
        self.edges
            .iter()
            .filter(|(edge, _)| edge.from.0 == label && edge.from.1 == id)
            .map(|(edge, props)| (edge.kind.clone(), edge.to.1.clone(), props.clone()))
            .collect()
    }

    pub fn has_node(&self, label: &str, id: &str) -> bool {
        self.nodes.contains_key(&(label.to_string(), id.to_string()))
    }
}

/// Shared in-memory graph with optional failure injection.
#[derive(Default)]
pub struct MemoryGraph {
    state: Mutex<GraphState>,
    failing_subjects: Mutex<HashSet<String>>,
    applied: Mutex<Vec<GraphMutation>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future mutation for `subject_id` fail before it is applied.
    pub async fn fail_for(&self, subject_id: &str) {
        self.failing_subjects.lock().await.insert(subject_id.to_string());
    }

    /// Insert an edge directly, bypassing the mutation protocol.
    pub async fn seed_edge(&self, from: NodeKey, kind: &str, to: NodeKey, props: Props) {
        let mut state = self.state.lock().await;
        state.nodes.entry(from.clone()).or_default();
        state.nodes.entry(to.clone()).or_default();
        state.edges.insert(EdgeKey { from, kind: kind.to_string(), to }, props);
    }

    pub async fn snapshot(&self) -> GraphState {
        self.state.lock().await.clone()
    }

    /// Mutations applied successfully, in order.
    pub async fn applied(&self) -> Vec<GraphMutation> {
        self.applied.lock().await.clone()
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn apply(&self, mutation: &GraphMutation) -> SyncResult<()> {
        if self.failing_subjects.lock().await.contains(mutation.subject_id()) {
            return Err(SyncError::graph(format!(
                "injected failure for subject {}",
                mutation.subject_id()
            )));
        }

        // Apply to a copy and swap it in, so a mutation is all-or-nothing.
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.apply(mutation);
        *state = next;
        drop(state);

        self.applied.lock().await.push(mutation.clone());
        Ok(())
    }
}
