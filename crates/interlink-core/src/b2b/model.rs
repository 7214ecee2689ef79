//! B2B source rows and aggregate records.

use serde::{Deserialize, Serialize};

use crate::fold::Timestamp;

/// Action type counted as a product view.
pub const VIEW_PRODUCT: &str = "view_product";

/// Feedback type marking an approved match.
pub const FEEDBACK_APPROVED: &str = "approved";

/// Feedback type marking a rejected match.
pub const FEEDBACK_REJECTED: &str = "rejected";

/// A vendor user joined with its vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorUserRow {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub updated_at: Option<Timestamp>,
    pub vendor_id: String,
    pub vendor_name: Option<String>,
}

/// One row of `vendor_user_actions` that references a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductActionRow {
    pub product_id: String,
    pub action_type: String,
    pub created_at: Option<Timestamp>,
}

/// One row of `match_feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFeedbackRow {
    pub source_product_id: String,
    pub target_product_id: String,
    pub feedback_type: String,
    pub reason: Option<String>,
    pub created_at: Option<Timestamp>,
}

/// Per-product summary of a vendor user's actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2bProductAggregate {
    pub product_id: String,
    pub views_count: i64,
    pub last_view_at: Option<Timestamp>,
}

impl B2bProductAggregate {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            views_count: 0,
            last_view_at: None,
        }
    }
}

/// Per (source, target) summary of match feedback.
///
/// `approved` and `rejected` are independent: conflicting feedback for the
/// same pair leaves both set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAggregate {
    pub source_product_id: String,
    pub target_product_id: String,
    pub approved: bool,
    pub rejected: bool,
    pub reason: Option<String>,
    pub last_feedback_at: Option<Timestamp>,
}

impl MatchAggregate {
    pub fn new(source_product_id: impl Into<String>, target_product_id: impl Into<String>) -> Self {
        Self {
            source_product_id: source_product_id.into(),
            target_product_id: target_product_id.into(),
            approved: false,
            rejected: false,
            reason: None,
            last_feedback_at: None,
        }
    }

    pub fn is_conflicting(&self) -> bool {
        self.approved && self.rejected
    }
}

/// Raw interaction rows loaded for one vendor user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct B2bInteractions {
    pub actions: Vec<ProductActionRow>,
    pub feedback: Vec<MatchFeedbackRow>,
}

/// Everything the graph writer needs for one vendor user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2bSnapshot {
    pub user: VendorUserRow,
    pub products: Vec<B2bProductAggregate>,
    pub matches: Vec<MatchAggregate>,
}
