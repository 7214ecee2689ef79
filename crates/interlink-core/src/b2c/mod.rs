//! B2C interaction aggregation.
//!
//! Recipe records merge three sources keyed by recipe id; product records
//! come from the single interactions table.

pub mod model;

use std::collections::BTreeMap;

use crate::fold;
use model::{
    B2cInteractions, B2cProductAggregate, B2cSnapshot, CustomerRow, ProductInteractionRow, RecipeAggregate,
    RecipeHistoryRow, RecipeRatingRow, SavedRecipeRow, PRODUCT_PURCHASED, PRODUCT_SAVED,
    PRODUCT_VIEWED, RECIPE_COOKED, RECIPE_VIEWED,
};

/// Merge recipe history, saved recipes and ratings into one record per recipe.
pub fn aggregate_recipes(
    history: &[RecipeHistoryRow],
    saved: &[SavedRecipeRow],
    ratings: &[RecipeRatingRow],
) -> Vec<RecipeAggregate> {
    let mut agg: BTreeMap<&str, RecipeAggregate> = BTreeMap::new();

    for row in history {
        let entry = agg
            .entry(row.recipe_id.as_str())
            .or_insert_with(|| RecipeAggregate::new(&row.recipe_id));

        match row.event_type.as_str() {
            RECIPE_VIEWED => {
                entry.views_count += 1;
                fold::latest(&mut entry.last_view_at, row.event_at);
            }
            RECIPE_COOKED => {
                entry.cooks_count += 1;
                fold::latest(&mut entry.last_cook_at, row.event_at);
            }
            _ => {}
        }
    }

    for row in saved {
        let entry = agg
            .entry(row.recipe_id.as_str())
            .or_insert_with(|| RecipeAggregate::new(&row.recipe_id));
        entry.saved = true;
        fold::earliest(&mut entry.first_saved_at, row.saved_at);
    }

    for row in ratings {
        let entry = agg
            .entry(row.recipe_id.as_str())
            .or_insert_with(|| RecipeAggregate::new(&row.recipe_id));
        let Some(rating) = row.rating else { continue };
        let current = entry.rating.as_ref().map(|r| (entry.last_rating_at, r));
        if fold::supersedes(current, (row.created_at, &rating)) {
            entry.rating = Some(rating);
            entry.last_rating_at = row.created_at;
        }
    }

    agg.into_values().collect()
}

/// Fold product interactions into one record per product.
pub fn aggregate_products(interactions: &[ProductInteractionRow]) -> Vec<B2cProductAggregate> {
    let mut agg: BTreeMap<&str, B2cProductAggregate> = BTreeMap::new();

    for row in interactions {
        let entry = agg
            .entry(row.product_id.as_str())
            .or_insert_with(|| B2cProductAggregate::new(&row.product_id));
        let ts = row.interaction_timestamp;

        match row.interaction_type.as_str() {
            PRODUCT_VIEWED => {
                entry.views_count += 1;
                fold::latest(&mut entry.last_view_at, ts);
            }
            PRODUCT_PURCHASED => {
                entry.purchases_count += 1;
                fold::latest(&mut entry.last_purchase_at, ts);
                entry.quantity_total += row.quantity.unwrap_or(0);
                entry.price_total += row.price_paid.unwrap_or(0.0);
            }
            PRODUCT_SAVED => entry.saved = true,
            _ => {}
        }

        // Any interaction type may carry a rating.
        if let Some(rating) = row.rating {
            let current = entry.rating.as_ref().map(|r| (entry.last_rating_at, r));
            if fold::supersedes(current, (ts, &rating)) {
                entry.rating = Some(rating);
                entry.last_rating_at = ts;
            }
        }
    }

    agg.into_values().collect()
}

impl B2cSnapshot {
    /// Aggregate a customer's raw rows.
    pub fn build(customer: CustomerRow, rows: &B2cInteractions) -> Self {
        Self {
            customer,
            recipes: aggregate_recipes(&rows.history, &rows.saved, &rows.ratings),
            products: aggregate_products(&rows.products),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fold::Timestamp;
    use chrono::TimeZone;

    fn ts(secs: i64) -> Option<Timestamp> {
        chrono::Utc.timestamp_opt(secs, 0).single()
    }

    fn interaction(product: &str, kind: &str, at: i64) -> ProductInteractionRow {
        ProductInteractionRow {
            product_id: product.to_string(),
            interaction_type: kind.to_string(),
            rating: None,
            quantity: None,
            price_paid: None,
            interaction_timestamp: ts(at),
        }
    }

    fn history(recipe: &str, kind: &str, at: i64) -> RecipeHistoryRow {
        RecipeHistoryRow {
            recipe_id: recipe.to_string(),
            event_type: kind.to_string(),
            event_at: ts(at),
        }
    }

    #[test]
    fn test_view_view_purchase() {
        let purchase = ProductInteractionRow {
            quantity: Some(2),
            price_paid: Some(9.5),
            ..interaction("p1", PRODUCT_PURCHASED, 150)
        };
        let rows = vec![
            interaction("p1", PRODUCT_VIEWED, 100),
            interaction("p1", PRODUCT_VIEWED, 200),
            purchase,
        ];

        let products = aggregate_products(&rows);
        assert_eq!(products.len(), 1);
        let p = &products[0];
        assert_eq!(p.views_count, 2);
        assert_eq!(p.last_view_at, ts(200));
        assert_eq!(p.purchases_count, 1);
        assert_eq!(p.last_purchase_at, ts(150));
        assert_eq!(p.quantity_total, 2);
        assert!((p.price_total - 9.5).abs() < f64::EPSILON);
        assert!(!p.saved);
        assert_eq!(p.rating, None);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(aggregate_products(&[]).is_empty());
        assert!(aggregate_recipes(&[], &[], &[]).is_empty());
    }

    #[test]
    fn test_unrecognized_interaction_yields_unset_record() {
        let products = aggregate_products(&[interaction("p9", "shared", 1)]);
        assert_eq!(products, vec![B2cProductAggregate::new("p9")]);
    }

    #[test]
    fn test_first_saved_at_takes_minimum() {
        let saved = vec![
            SavedRecipeRow { recipe_id: "r1".to_string(), saved_at: ts(200) },
            SavedRecipeRow { recipe_id: "r1".to_string(), saved_at: ts(100) },
        ];
        let recipes = aggregate_recipes(&[], &saved, &[]);
        assert_eq!(recipes.len(), 1);
        assert!(recipes[0].saved);
        assert_eq!(recipes[0].first_saved_at, ts(100));
        assert_eq!(recipes[0].views_count, 0);
        assert_eq!(recipes[0].last_view_at, None);
    }

    #[test]
    fn test_last_view_at_takes_maximum() {
        let rows = vec![history("r1", RECIPE_VIEWED, 100), history("r1", RECIPE_VIEWED, 200)];
        let recipes = aggregate_recipes(&rows, &[], &[]);
        assert_eq!(recipes[0].views_count, 2);
        assert_eq!(recipes[0].last_view_at, ts(200));
    }

    #[test]
    fn test_recipe_sources_merge_per_recipe() {
        let rows = vec![
            history("r1", RECIPE_VIEWED, 10),
            history("r1", RECIPE_COOKED, 20),
            history("r2", RECIPE_COOKED, 30),
        ];
        let saved = vec![SavedRecipeRow { recipe_id: "r1".to_string(), saved_at: ts(15) }];
        let ratings = vec![RecipeRatingRow {
            recipe_id: "r3".to_string(),
            rating: Some(4.0),
            created_at: ts(40),
        }];

        let recipes = aggregate_recipes(&rows, &saved, &ratings);
        assert_eq!(recipes.len(), 3);

        let r1 = &recipes[0];
        assert_eq!((r1.views_count, r1.cooks_count), (1, 1));
        assert!(r1.saved);
        assert_eq!(r1.rating, None);

        let r2 = &recipes[1];
        assert_eq!(r2.cooks_count, 1);
        assert_eq!(r2.last_cook_at, ts(30));
        assert!(!r2.saved);

        let r3 = &recipes[2];
        assert_eq!(r3.rating, Some(4.0));
        assert_eq!(r3.last_rating_at, ts(40));
        assert_eq!(r3.views_count, 0);
    }

    #[test]
    fn test_latest_rating_wins_regardless_of_order() {
        let ratings = vec![
            RecipeRatingRow { recipe_id: "r1".to_string(), rating: Some(5.0), created_at: ts(300) },
            RecipeRatingRow { recipe_id: "r1".to_string(), rating: Some(2.0), created_at: ts(100) },
        ];
        let reversed: Vec<_> = ratings.iter().cloned().rev().collect();

        let a = aggregate_recipes(&[], &[], &ratings);
        let b = aggregate_recipes(&[], &[], &reversed);
        assert_eq!(a, b);
        assert_eq!(a[0].rating, Some(5.0));
        assert_eq!(a[0].last_rating_at, ts(300));
    }

    #[test]
    fn test_ratings_with_same_stamp_resolve_independently_of_order() {
        let ratings = vec![
            RecipeRatingRow { recipe_id: "r1".to_string(), rating: Some(2.0), created_at: ts(100) },
            RecipeRatingRow { recipe_id: "r1".to_string(), rating: Some(4.5), created_at: ts(100) },
        ];
        let reversed: Vec<_> = ratings.iter().cloned().rev().collect();

        let a = aggregate_recipes(&[], &[], &ratings);
        assert_eq!(a, aggregate_recipes(&[], &[], &reversed));
        assert_eq!(a[0].rating, Some(4.5));

        let rows = vec![
            ProductInteractionRow { rating: Some(1.0), ..interaction("p1", PRODUCT_VIEWED, 70) },
            ProductInteractionRow { rating: Some(3.0), ..interaction("p1", PRODUCT_PURCHASED, 70) },
        ];
        let flipped: Vec<_> = rows.iter().cloned().rev().collect();
        assert_eq!(aggregate_products(&rows), aggregate_products(&flipped));
        assert_eq!(aggregate_products(&rows)[0].rating, Some(3.0));
    }

    #[test]
    fn test_product_rating_on_any_interaction() {
        let rated_view = ProductInteractionRow {
            rating: Some(3.0),
            ..interaction("p1", PRODUCT_VIEWED, 50)
        };
        let saved = interaction("p1", PRODUCT_SAVED, 60);
        let products = aggregate_products(&[rated_view, saved]);
        assert_eq!(products[0].rating, Some(3.0));
        assert_eq!(products[0].last_rating_at, ts(50));
        assert!(products[0].saved);
    }
}
