//! B2C source rows and aggregate records.

use serde::{Deserialize, Serialize};

use crate::fold::Timestamp;

pub const RECIPE_VIEWED: &str = "viewed";
pub const RECIPE_COOKED: &str = "cooked";

pub const PRODUCT_VIEWED: &str = "viewed";
pub const PRODUCT_PURCHASED: &str = "purchased";
pub const PRODUCT_SAVED: &str = "saved";

/// A B2C customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRow {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub updated_at: Option<Timestamp>,
}

/// One row of `recipe_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeHistoryRow {
    pub recipe_id: String,
    pub event_type: String,
    pub event_at: Option<Timestamp>,
}

/// One row of `saved_recipes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipeRow {
    pub recipe_id: String,
    pub saved_at: Option<Timestamp>,
}

/// One row of `recipe_ratings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRatingRow {
    pub recipe_id: String,
    pub rating: Option<f64>,
    pub created_at: Option<Timestamp>,
}

/// One row of `customer_product_interactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInteractionRow {
    pub product_id: String,
    pub interaction_type: String,
    pub rating: Option<f64>,
    pub quantity: Option<i64>,
    pub price_paid: Option<f64>,
    pub interaction_timestamp: Option<Timestamp>,
}

/// Per-recipe summary merged from history, saves and ratings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeAggregate {
    pub recipe_id: String,
    pub views_count: i64,
    pub last_view_at: Option<Timestamp>,
    pub cooks_count: i64,
    pub last_cook_at: Option<Timestamp>,
    pub saved: bool,
    pub first_saved_at: Option<Timestamp>,
    pub rating: Option<f64>,
    pub last_rating_at: Option<Timestamp>,
}

impl RecipeAggregate {
    pub fn new(recipe_id: impl Into<String>) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            views_count: 0,
            last_view_at: None,
            cooks_count: 0,
            last_cook_at: None,
            saved: false,
            first_saved_at: None,
            rating: None,
            last_rating_at: None,
        }
    }
}

/// Per-product summary of a customer's interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2cProductAggregate {
    pub product_id: String,
    pub views_count: i64,
    pub last_view_at: Option<Timestamp>,
    pub purchases_count: i64,
    pub last_purchase_at: Option<Timestamp>,
    pub saved: bool,
    pub rating: Option<f64>,
    pub last_rating_at: Option<Timestamp>,
    pub quantity_total: i64,
    pub price_total: f64,
}

impl B2cProductAggregate {
    pub fn new(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            views_count: 0,
            last_view_at: None,
            purchases_count: 0,
            last_purchase_at: None,
            saved: false,
            rating: None,
            last_rating_at: None,
            quantity_total: 0,
            price_total: 0.0,
        }
    }
}

/// Raw interaction rows loaded for one customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct B2cInteractions {
    pub history: Vec<RecipeHistoryRow>,
    pub saved: Vec<SavedRecipeRow>,
    pub ratings: Vec<RecipeRatingRow>,
    pub products: Vec<ProductInteractionRow>,
}

/// Everything the graph writer needs for one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct B2cSnapshot {
    pub customer: CustomerRow,
    pub recipes: Vec<RecipeAggregate>,
    pub products: Vec<B2cProductAggregate>,
}
