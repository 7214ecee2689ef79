//! B2B interaction aggregation.
//!
//! Folds a vendor user's product actions and match feedback into one record
//! per product and one record per (source, target) product pair.

pub mod model;

use std::collections::BTreeMap;

use crate::fold::{self, Timestamp};
use model::{
    B2bInteractions, B2bProductAggregate, B2bSnapshot, MatchAggregate, MatchFeedbackRow, ProductActionRow,
    VendorUserRow, FEEDBACK_APPROVED, FEEDBACK_REJECTED, VIEW_PRODUCT,
};

/// Fold product actions into one record per product.
///
/// Products whose only actions are not views still get a zero record.
pub fn aggregate_products(actions: &[ProductActionRow]) -> Vec<B2bProductAggregate> {
    let mut agg: BTreeMap<&str, B2bProductAggregate> = BTreeMap::new();

    for row in actions {
        let entry = agg
            .entry(row.product_id.as_str())
            .or_insert_with(|| B2bProductAggregate::new(&row.product_id));

        if row.action_type == VIEW_PRODUCT {
            entry.views_count += 1;
            fold::latest(&mut entry.last_view_at, row.created_at);
        }
    }

    agg.into_values().collect()
}

/// Fold match feedback into one record per (source, target) pair.
///
/// The rejection reason is taken from the most recent rejected row; rows
/// sharing a stamp resolve to the greater reason.
pub fn aggregate_matches(feedback: &[MatchFeedbackRow]) -> Vec<MatchAggregate> {
    let mut agg: BTreeMap<(&str, &str), (MatchAggregate, Option<Timestamp>)> = BTreeMap::new();

    for row in feedback {
        let key = (row.source_product_id.as_str(), row.target_product_id.as_str());
        let (entry, reason_at) = agg.entry(key).or_insert_with(|| {
            (MatchAggregate::new(&row.source_product_id, &row.target_product_id), None)
        });

        fold::latest(&mut entry.last_feedback_at, row.created_at);

        match row.feedback_type.as_str() {
            FEEDBACK_APPROVED => entry.approved = true,
            FEEDBACK_REJECTED => {
                let current = entry.rejected.then_some((*reason_at, &entry.reason));
                if fold::supersedes(current, (row.created_at, &row.reason)) {
                    entry.reason = row.reason.clone();
                    *reason_at = row.created_at;
                }
                entry.rejected = true;
            }
            _ => {}
        }
    }

    agg.into_values().map(|(entry, _)| entry).collect()
}

impl B2bSnapshot {
    /// Aggregate a vendor user's raw rows.
    pub fn build(user: VendorUserRow, rows: &B2bInteractions) -> Self {
        Self {
            user,
            products: aggregate_products(&rows.actions),
            matches: aggregate_matches(&rows.feedback),
        }
    }
}
