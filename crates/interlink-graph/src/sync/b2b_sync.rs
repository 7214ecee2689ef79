//! B2B mutation planning.
//!
//! Creates nodes and relationships:
//! - (:VendorUser)-[:BELONGS_TO_VENDOR]->(:Vendor)
//! - (:VendorUser)-[:VIEWED_PRODUCT {count, last_at}]->(:Product)
//! - (:VendorUser)-[:APPROVED_MATCH {source_product_id, last_at}]->(:Product)
//! - (:VendorUser)-[:REJECTED_MATCH {source_product_id, reason, last_at}]->(:Product)

use interlink_core::b2b::model::{B2bProductAggregate, B2bSnapshot, MatchAggregate};
use interlink_core::mutation::{attrs, props};
use interlink_core::{EdgeFamily, EdgeWrite, GraphMutation, NodeUpsert, PropValue};
use tracing::debug;

use super::{EdgeRule, FamilyRules};

pub const SUBJECT_LABEL: &str = "VendorUser";

const PRODUCT_RULES: &[EdgeRule<B2bProductAggregate>] = &[EdgeRule {
    kind: "VIEWED_PRODUCT",
    when: |p| p.views_count > 0,
    props: |p| {
        props([
            ("count", Some(PropValue::Int(p.views_count))),
            ("last_at", p.last_view_at.map(PropValue::from)),
        ])
    },
}];

const MATCH_RULES: &[EdgeRule<MatchAggregate>] = &[
    EdgeRule {
        kind: "APPROVED_MATCH",
        when: |m| m.approved,
        props: |m| {
            props([
                ("source_product_id", Some(PropValue::from(m.source_product_id.as_str()))),
                ("last_at", m.last_feedback_at.map(PropValue::from)),
            ])
        },
    },
    EdgeRule {
        kind: "REJECTED_MATCH",
        when: |m| m.rejected,
        props: |m| {
            props([
                ("source_product_id", Some(PropValue::from(m.source_product_id.as_str()))),
                ("reason", m.reason.as_deref().map(PropValue::from)),
                ("last_at", m.last_feedback_at.map(PropValue::from)),
            ])
        },
    },
];

pub const PRODUCT_FAMILY: FamilyRules<B2bProductAggregate> = FamilyRules {
    name: "product_views",
    counterpart: "Product",
    rules: PRODUCT_RULES,
    target: |p| p.product_id.clone(),
    nodes: |p| vec![p.product_id.clone()],
};

pub const MATCH_FAMILY: FamilyRules<MatchAggregate> = FamilyRules {
    name: "match_feedback",
    counterpart: "Product",
    rules: MATCH_RULES,
    target: |m| m.target_product_id.clone(),
    nodes: |m| vec![m.source_product_id.clone(), m.target_product_id.clone()],
};

/// Plan the full replacement of a vendor user's managed edges.
pub fn plan_b2b(snapshot: &B2bSnapshot) -> GraphMutation {
    let user = &snapshot.user;

    let subject = NodeUpsert::new(SUBJECT_LABEL, &user.id).with_props(attrs([
        ("email", user.email.as_deref().map(PropValue::from)),
        ("role", user.role.as_deref().map(PropValue::from)),
        ("updated_at", user.updated_at.map(PropValue::from)),
    ]));

    // A user belongs to exactly one vendor; clearing the kind first moves the
    // link when the user changes vendor.
    let vendor = EdgeFamily {
        name: "vendor".to_string(),
        counterpart_label: "Vendor".to_string(),
        managed_kinds: vec!["BELONGS_TO_VENDOR".to_string()],
        nodes: vec![NodeUpsert::new("Vendor", &user.vendor_id).with_props(attrs([(
            "name",
            user.vendor_name.as_deref().map(PropValue::from),
        )]))],
        edges: vec![EdgeWrite {
            kind: "BELONGS_TO_VENDOR".to_string(),
            target_id: user.vendor_id.clone(),
            props: Default::default(),
        }],
    };

    let conflicts = snapshot.matches.iter().filter(|m| m.is_conflicting()).count();
    if conflicts > 0 {
        debug!(user_id = %user.id, conflicts, "Match feedback has both approved and rejected rows");
    }

    GraphMutation::ReplaceSubject {
        subject,
        families: vec![
            vendor,
            PRODUCT_FAMILY.build(&snapshot.products),
            MATCH_FAMILY.build(&snapshot.matches),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use interlink_core::b2b::model::VendorUserRow;

    fn user() -> VendorUserRow {
        VendorUserRow {
            id: "u1".to_string(),
            email: Some("buyer@vendor.test".to_string()),
            role: None,
            updated_at: None,
            vendor_id: "v1".to_string(),
            vendor_name: Some("Acme".to_string()),
        }
    }

    fn families(mutation: &GraphMutation) -> &[EdgeFamily] {
        match mutation {
            GraphMutation::ReplaceSubject { families, .. } => families,
            GraphMutation::DetachSubject { .. } => panic!("expected replace"),
        }
    }

    #[test]
    fn test_zero_view_product_gets_node_but_no_edge() {
        let snapshot = B2bSnapshot {
            user: user(),
            products: vec![
                B2bProductAggregate::new("p0"),
                B2bProductAggregate {
                    views_count: 2,
                    last_view_at: chrono::Utc.timestamp_opt(100, 0).single(),
                    ..B2bProductAggregate::new("p1")
                },
            ],
            matches: vec![],
        };

        let mutation = plan_b2b(&snapshot);
        let products = &families(&mutation)[1];
        assert_eq!(products.managed_kinds, vec!["VIEWED_PRODUCT"]);
        assert_eq!(products.nodes.len(), 2);
        assert_eq!(products.edges.len(), 1);
        assert_eq!(products.edges[0].target_id, "p1");
        assert_eq!(products.edges[0].props.get("count"), Some(&PropValue::Int(2)));
    }

    #[test]
    fn test_conflicting_match_writes_both_edges() {
        let snapshot = B2bSnapshot {
            user: user(),
            products: vec![],
            matches: vec![MatchAggregate {
                approved: true,
                rejected: true,
                reason: Some("price".to_string()),
                ..MatchAggregate::new("s1", "t1")
            }],
        };

        let mutation = plan_b2b(&snapshot);
        let matches = &families(&mutation)[2];
        let kinds: Vec<_> = matches.edges.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["APPROVED_MATCH", "REJECTED_MATCH"]);
        assert!(matches.edges.iter().all(|e| e.target_id == "t1"));
        assert_eq!(matches.nodes.len(), 2);
        assert_eq!(
            matches.edges[1].props.get("reason"),
            Some(&PropValue::Text("price".to_string()))
        );
    }

    #[test]
    fn test_subject_and_vendor_link() {
        let mutation = plan_b2b(&B2bSnapshot { user: user(), products: vec![], matches: vec![] });
        match &mutation {
            GraphMutation::ReplaceSubject { subject, families } => {
                assert_eq!(subject.label, "VendorUser");
                assert_eq!(subject.props.get("role"), Some(&PropValue::Null));
                assert_eq!(families[0].edges[0].kind, "BELONGS_TO_VENDOR");
                assert_eq!(families[0].edges[0].target_id, "v1");
            }
            GraphMutation::DetachSubject { .. } => panic!("expected replace"),
        }
        assert_eq!(mutation.edge_count(), 1);
    }
}
