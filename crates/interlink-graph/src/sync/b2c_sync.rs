//! B2C mutation planning.
//!
//! Creates nodes and relationships:
//! - (:B2CCustomer)-[:VIEWED|COOKED|SAVED|RATED]->(:Recipe)
//! - (:B2CCustomer)-[:VIEWED_PRODUCT|PURCHASED|SAVED_PRODUCT|RATED_PRODUCT]->(:Product)

use interlink_core::b2c::model::{B2cProductAggregate, B2cSnapshot, RecipeAggregate};
use interlink_core::mutation::{attrs, props};
use interlink_core::{GraphMutation, NodeUpsert, PropValue};

use super::{EdgeRule, FamilyRules};

pub const SUBJECT_LABEL: &str = "B2CCustomer";

const RECIPE_RULES: &[EdgeRule<RecipeAggregate>] = &[
    EdgeRule {
        kind: "VIEWED",
        when: |r| r.views_count > 0,
        props: |r| {
            props([
                ("count", Some(PropValue::Int(r.views_count))),
                ("last_at", r.last_view_at.map(PropValue::from)),
            ])
        },
    },
    EdgeRule {
        kind: "COOKED",
        when: |r| r.cooks_count > 0,
        props: |r| {
            props([
                ("count", Some(PropValue::Int(r.cooks_count))),
                ("last_at", r.last_cook_at.map(PropValue::from)),
            ])
        },
    },
    EdgeRule {
        kind: "SAVED",
        when: |r| r.saved,
        props: |r| props([("first_saved_at", r.first_saved_at.map(PropValue::from))]),
    },
    EdgeRule {
        kind: "RATED",
        when: |r| r.rating.is_some(),
        props: |r| {
            props([
                ("rating", r.rating.map(PropValue::Float)),
                ("last_at", r.last_rating_at.map(PropValue::from)),
            ])
        },
    },
];

const PRODUCT_RULES: &[EdgeRule<B2cProductAggregate>] = &[
    EdgeRule {
        kind: "VIEWED_PRODUCT",
        when: |p| p.views_count > 0,
        props: |p| {
            props([
                ("count", Some(PropValue::Int(p.views_count))),
                ("last_at", p.last_view_at.map(PropValue::from)),
            ])
        },
    },
    EdgeRule {
        kind: "PURCHASED",
        when: |p| p.purchases_count > 0,
        props: |p| {
            props([
                ("count", Some(PropValue::Int(p.purchases_count))),
                ("last_at", p.last_purchase_at.map(PropValue::from)),
                ("quantity_total", Some(PropValue::Int(p.quantity_total))),
                ("price_total", Some(PropValue::Float(p.price_total))),
            ])
        },
    },
    EdgeRule {
        kind: "SAVED_PRODUCT",
        when: |p| p.saved,
        props: |_| Default::default(),
    },
    EdgeRule {
        kind: "RATED_PRODUCT",
        when: |p| p.rating.is_some(),
        props: |p| {
            props([
                ("rating", p.rating.map(PropValue::Float)),
                ("last_at", p.last_rating_at.map(PropValue::from)),
            ])
        },
    },
];

pub const RECIPE_FAMILY: FamilyRules<RecipeAggregate> = FamilyRules {
    name: "recipe_interactions",
    counterpart: "Recipe",
    rules: RECIPE_RULES,
    target: |r| r.recipe_id.clone(),
    nodes: |r| vec![r.recipe_id.clone()],
};

pub const PRODUCT_FAMILY: FamilyRules<B2cProductAggregate> = FamilyRules {
    name: "product_interactions",
    counterpart: "Product",
    rules: PRODUCT_RULES,
    target: |p| p.product_id.clone(),
    nodes: |p| vec![p.product_id.clone()],
};

/// Plan the full replacement of a customer's managed edges.
pub fn plan_b2c(snapshot: &B2cSnapshot) -> GraphMutation {
    let customer = &snapshot.customer;

    let subject = NodeUpsert::new(SUBJECT_LABEL, &customer.id).with_props(attrs([
        ("email", customer.email.as_deref().map(PropValue::from)),
        ("full_name", customer.full_name.as_deref().map(PropValue::from)),
        ("updated_at", customer.updated_at.map(PropValue::from)),
    ]));

    GraphMutation::ReplaceSubject {
        subject,
        families: vec![
            RECIPE_FAMILY.build(&snapshot.recipes),
            PRODUCT_FAMILY.build(&snapshot.products),
        ],
    }
}
