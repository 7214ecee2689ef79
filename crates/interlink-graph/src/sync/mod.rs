//! Mutation planning for interaction sync.
//!
//! Each edge family is a static table of [`EdgeRule`]s: an edge of kind `K`
//! exists iff the rule's predicate holds for the aggregate record, and its
//! properties come from the rule's setter. The planners turn a subject
//! snapshot into a [`GraphMutation`] without touching any store.

pub mod b2b_sync;
pub mod b2c_sync;

use std::collections::BTreeMap;

use interlink_core::{Domain, EdgeFamily, EdgeWrite, GraphMutation, NodeUpsert, Props};

pub use b2b_sync::plan_b2b;
pub use b2c_sync::plan_b2c;

/// "Create edge `kind` iff `when` holds, with properties from `props`."
pub struct EdgeRule<A> {
    pub kind: &'static str,
    pub when: fn(&A) -> bool,
    pub props: fn(&A) -> Props,
}

/// A managed family of edge kinds sharing one counterparty label.
pub struct FamilyRules<A: 'static> {
    pub name: &'static str,
    pub counterpart: &'static str,
    pub rules: &'static [EdgeRule<A>],
    /// Counterparty id an edge built from the record points to.
    pub target: fn(&A) -> String,
    /// Counterparty nodes upserted for the record, edge or not.
    pub nodes: fn(&A) -> Vec<String>,
}

impl<A: 'static> FamilyRules<A> {
    /// Every kind this family clears before rebuilding.
    pub fn managed_kinds(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.kind.to_string()).collect()
    }

    /// Evaluate the rule table over `records`.
    ///
    /// Edges are singletons per (kind, counterparty); if two records map to
    /// the same pair, the later record wins.
    pub fn build(&self, records: &[A]) -> EdgeFamily {
        let mut nodes: BTreeMap<String, NodeUpsert> = BTreeMap::new();
        let mut edges: BTreeMap<(&'static str, String), EdgeWrite> = BTreeMap::new();

        for record in records {
            for id in (self.nodes)(record) {
                nodes
                    .entry(id.clone())
                    .or_insert_with(|| NodeUpsert::new(self.counterpart, id));
            }

            let target = (self.target)(record);
            for rule in self.rules.iter().filter(|r| (r.when)(record)) {
                edges.insert(
                    (rule.kind, target.clone()),
                    EdgeWrite {
                        kind: rule.kind.to_string(),
                        target_id: target.clone(),
                        props: (rule.props)(record),
                    },
                );
            }
        }

        EdgeFamily {
            name: self.name.to_string(),
            counterpart_label: self.counterpart.to_string(),
            managed_kinds: self.managed_kinds(),
            nodes: nodes.into_values().collect(),
            edges: edges.into_values().collect(),
        }
    }
}

/// Node label of a domain's subject.
pub fn subject_label(domain: Domain) -> &'static str {
    match domain {
        Domain::B2b => b2b_sync::SUBJECT_LABEL,
        Domain::B2c => b2c_sync::SUBJECT_LABEL,
    }
}

/// Mutation removing a subject and every edge attached to it.
pub fn plan_detach(label: &str, id: &str) -> GraphMutation {
    GraphMutation::DetachSubject {
        label: label.to_string(),
        id: id.to_string(),
    }
}
