//! Per-domain pipelines: load the subject, aggregate, plan the mutation.

use async_trait::async_trait;
use tracing::{info, warn};

use interlink_core::b2b::model::B2bSnapshot;
use interlink_core::b2c::model::B2cSnapshot;
use interlink_core::{B2bSource, B2cSource, Domain, EventOp, GraphMutation, SyncResult};
use interlink_graph::sync::{b2b_sync, b2c_sync};
use interlink_graph::{plan_b2b, plan_b2c, plan_detach};

/// What a pipeline wants written for a subject.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Write(GraphMutation),
    /// The subject is missing at the source and the op is not a delete.
    SkipMissingSubject,
}

/// Loader + aggregator + planner for one domain.
#[async_trait]
pub trait Pipeline: Send + Sync {
    fn domain(&self) -> Domain;

    /// Recompute the subject's mutation from current source state.
    async fn plan(&self, subject_id: &str, op: EventOp) -> SyncResult<Plan>;
}

/// Vendor users: product views and match feedback.
pub struct B2bPipeline<S> {
    source: S,
}

impl<S: B2bSource> B2bPipeline<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: B2bSource> Pipeline for B2bPipeline<S> {
    fn domain(&self) -> Domain {
        Domain::B2b
    }

    async fn plan(&self, subject_id: &str, op: EventOp) -> SyncResult<Plan> {
        let Some(user) = self.source.load_vendor_user(subject_id).await? else {
            return Ok(missing_subject(b2b_sync::SUBJECT_LABEL, subject_id, op));
        };

        let rows = self.source.load_interactions(subject_id).await?;
        let snapshot = B2bSnapshot::build(user, &rows);
        info!(
            aggregate_id = subject_id,
            products = snapshot.products.len(),
            matches = snapshot.matches.len(),
            "Aggregated B2B interactions"
        );

        Ok(Plan::Write(plan_b2b(&snapshot)))
    }
}

/// B2C customers: recipe and product interactions.
pub struct B2cPipeline<S> {
    source: S,
}

impl<S: B2cSource> B2cPipeline<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: B2cSource> Pipeline for B2cPipeline<S> {
    fn domain(&self) -> Domain {
        Domain::B2c
    }

    async fn plan(&self, subject_id: &str, op: EventOp) -> SyncResult<Plan> {
        let Some(customer) = self.source.load_customer(subject_id).await? else {
            return Ok(missing_subject(b2c_sync::SUBJECT_LABEL, subject_id, op));
        };

        let rows = self.source.load_interactions(subject_id).await?;
        let snapshot = B2cSnapshot::build(customer, &rows);
        info!(
            aggregate_id = subject_id,
            recipes = snapshot.recipes.len(),
            products = snapshot.products.len(),
            "Aggregated B2C interactions"
        );

        Ok(Plan::Write(plan_b2c(&snapshot)))
    }
}

fn missing_subject(label: &str, subject_id: &str, op: EventOp) -> Plan {
    if op.is_delete() {
        info!(aggregate_id = subject_id, label, "Subject deleted at source; removing from graph");
        Plan::Write(plan_detach(label, subject_id))
    } else {
        // Expected race with a later-committed delete of the same subject.
        warn!(aggregate_id = subject_id, label, op = %op, "Subject missing at source; skipping");
        Plan::SkipMissingSubject
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixtures;

    #[tokio::test]
    async fn test_missing_subject_on_update_is_skipped() {
        let pipeline = B2cPipeline::new(Fixtures::default());
        let plan = pipeline.plan("ghost", EventOp::Update).await.unwrap();
        assert_eq!(plan, Plan::SkipMissingSubject);
    }

    #[tokio::test]
    async fn test_missing_subject_on_delete_detaches() {
        let pipeline = B2bPipeline::new(Fixtures::default());
        let plan = pipeline.plan("gone", EventOp::Delete).await.unwrap();
        assert_eq!(
            plan,
            Plan::Write(GraphMutation::DetachSubject {
                label: "VendorUser".to_string(),
                id: "gone".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_delete_op_with_present_subject_resyncs() {
        let fixtures = Fixtures::default().with_vendor_user("u1", "v1");
        let pipeline = B2bPipeline::new(fixtures);
        let plan = pipeline.plan("u1", EventOp::Delete).await.unwrap();
        assert!(matches!(plan, Plan::Write(GraphMutation::ReplaceSubject { .. })));
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let fixtures = Fixtures::default().with_customer("c1").failing_loads();
        let pipeline = B2cPipeline::new(fixtures);
        assert!(pipeline.plan("c1", EventOp::Insert).await.is_err());
    }
}
