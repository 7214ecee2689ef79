//! Routes outbox events to the pipeline registered for their domain tag.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use interlink_core::{Domain, EventOp, GraphMutation, GraphStore, OutboxEvent, SyncResult};

use crate::outcome::EventOutcome;
use crate::pipeline::{Pipeline, Plan};

/// Domain tag to pipeline table, plus the graph store every pipeline writes to.
pub struct Router {
    pipelines: HashMap<Domain, Arc<dyn Pipeline>>,
    graph: Arc<dyn GraphStore>,
}

impl Router {
    pub fn new(graph: Arc<dyn GraphStore>) -> Self {
        Self {
            pipelines: HashMap::new(),
            graph,
        }
    }

    /// Register a pipeline under its own domain, replacing any previous one.
    pub fn register(mut self, pipeline: Arc<dyn Pipeline>) -> Self {
        self.pipelines.insert(pipeline.domain(), pipeline);
        self
    }

    pub fn pipeline(&self, domain: Domain) -> Option<&Arc<dyn Pipeline>> {
        self.pipelines.get(&domain)
    }

    /// Compute a subject's mutation without writing it.
    pub async fn plan(&self, domain: Domain, subject_id: &str, op: EventOp) -> SyncResult<Option<Plan>> {
        match self.pipeline(domain) {
            Some(pipeline) => pipeline.plan(subject_id, op).await.map(Some),
            None => Ok(None),
        }
    }

    /// Handle one event end to end.
    pub async fn dispatch(&self, event: &OutboxEvent) -> SyncResult<EventOutcome> {
        let Some(domain) = event.domain().filter(|d| self.pipelines.contains_key(d)) else {
            warn!(
                event_id = event.id,
                aggregate_type = %event.aggregate_type,
                "No pipeline for aggregate type"
            );
            return Ok(EventOutcome::Unrouted);
        };

        debug!(
            event_id = event.id,
            domain = %domain,
            aggregate_id = %event.aggregate_id,
            op = %event.op,
            source_table = %event.source_table,
            "Dispatching outbox event"
        );
        self.sync_subject(domain, &event.aggregate_id, event.op).await
    }

    /// Recompute and write one subject.
    pub async fn sync_subject(&self, domain: Domain, subject_id: &str, op: EventOp) -> SyncResult<EventOutcome> {
        match self.plan(domain, subject_id, op).await? {
            None => Ok(EventOutcome::Unrouted),
            Some(Plan::SkipMissingSubject) => Ok(EventOutcome::SkippedMissingSubject),
            Some(Plan::Write(mutation)) => {
                self.graph.apply(&mutation).await?;
                Ok(match &mutation {
                    GraphMutation::DetachSubject { .. } => EventOutcome::Deleted,
                    GraphMutation::ReplaceSubject { .. } => EventOutcome::Synced {
                        edges: mutation.edge_count(),
                    },
                })
            }
        }
    }
}
