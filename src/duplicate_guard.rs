//! # Duplicate Guard Module
//!
//! Checks a rolling recent-entry window for a near-match to block accidental
//! double-entry. Purchases match on the same ingredient with quantity and
//! amount inside absolute tolerances; expenses have no canonical key, so
//! "same entity" is description similarity instead. Tolerances are
//! absolute, not relative to the transaction magnitude.

use chrono::Duration;
use log::info;

use crate::model::{Expense, Purchase};
use crate::similarity::similarity_ci;

/// Quantity tolerance in buy units
pub const QUANTITY_TOLERANCE: f64 = 0.1;
/// Amount tolerance in currency units
pub const AMOUNT_TOLERANCE: f64 = 1.0;
/// Similarity above which two expense descriptions count as the same entity
pub const DESCRIPTION_SIMILARITY: f64 = 0.7;

/// Default lookback window for the recent-entry scan
pub fn default_lookback() -> Duration {
    Duration::hours(24)
}

/// Find a recent purchase that near-matches the incoming one
///
/// A row matches when it references the same ingredient and both
/// `|quantity_row - quantity| < 0.1` and `|price_row - price| < 1` hold.
/// Never fails; an empty window simply finds nothing.
pub fn find_duplicate_purchase<'a>(
    recent: &'a [Purchase],
    ingredient_id: &str,
    quantity: f64,
    total_price: f64,
) -> Option<&'a Purchase> {
    let hit = recent.iter().find(|row| {
        row.ingredient_id == ingredient_id
            && (row.quantity - quantity).abs() < QUANTITY_TOLERANCE
            && (row.total_price - total_price).abs() < AMOUNT_TOLERANCE
    });
    if let Some(row) = hit {
        info!(
            "Duplicate purchase blocked: {} x{} for {} matches lot {}",
            row.ingredient_name, quantity, total_price, row.lot_id
        );
    }
    hit
}

/// Find a recent expense that near-matches the incoming one
///
/// Same-entity is description similarity > 0.7 (case-insensitive), combined
/// with the amount tolerance.
pub fn find_duplicate_expense<'a>(
    recent: &'a [Expense],
    description: &str,
    amount: f64,
) -> Option<&'a Expense> {
    let hit = recent.iter().find(|row| {
        similarity_ci(&row.description, description) > DESCRIPTION_SIMILARITY
            && (row.amount - amount).abs() < AMOUNT_TOLERANCE
    });
    if let Some(row) = hit {
        info!(
            "Duplicate expense blocked: '{}' for {} matches entry {}",
            row.description, amount, row.id
        );
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::CanonicalUnit;
    use chrono::{NaiveDate, Utc};

    fn purchase(ingredient_id: &str, quantity: f64, total_price: f64) -> Purchase {
        Purchase {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            ingredient_id: ingredient_id.to_string(),
            ingredient_name: "กุ้ง".to_string(),
            quantity,
            unit: CanonicalUnit::Kilogram,
            total_price,
            unit_price: total_price / quantity,
            stock_quantity: quantity,
            cost_per_stock_unit: total_price / quantity,
            actual_yield: None,
            supplier: None,
            lot_id: "lot-1".to_string(),
            created_at: Utc::now(),
            created_by: "test".to_string(),
        }
    }

    fn expense(description: &str, amount: f64) -> Expense {
        Expense {
            id: "e1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            description: description.to_string(),
            amount,
            category: "อื่นๆ".to_string(),
            created_at: Utc::now(),
            created_by: "test".to_string(),
        }
    }

    #[test]
    fn test_near_identical_purchase_is_flagged() {
        // Quantity off by 0.05 and price off by 0.5 is still a duplicate
        let recent = vec![purchase("ing-1", 5.0, 500.0)];
        assert!(find_duplicate_purchase(&recent, "ing-1", 5.05, 500.5).is_some());
    }

    #[test]
    fn test_different_quantity_is_not_flagged() {
        let recent = vec![purchase("ing-1", 5.0, 500.0)];
        assert!(find_duplicate_purchase(&recent, "ing-1", 10.0, 500.0).is_none());
    }

    #[test]
    fn test_different_ingredient_is_not_flagged() {
        let recent = vec![purchase("ing-1", 5.0, 500.0)];
        assert!(find_duplicate_purchase(&recent, "ing-2", 5.0, 500.0).is_none());
    }

    #[test]
    fn test_price_outside_tolerance_is_not_flagged() {
        let recent = vec![purchase("ing-1", 5.0, 500.0)];
        assert!(find_duplicate_purchase(&recent, "ing-1", 5.0, 502.0).is_none());
    }

    #[test]
    fn test_empty_window_finds_nothing() {
        assert!(find_duplicate_purchase(&[], "ing-1", 5.0, 500.0).is_none());
        assert!(find_duplicate_expense(&[], "ค่าไฟ", 100.0).is_none());
    }

    #[test]
    fn test_similar_expense_description_is_flagged() {
        let recent = vec![expense("ค่าไฟฟ้าเดือนนี้", 1200.0)];
        assert!(find_duplicate_expense(&recent, "ค่าไฟฟ้าเดือนนี้", 1200.5).is_some());
        // Minor typo still counts as the same entity
        assert!(find_duplicate_expense(&recent, "ค่าไฟฟ้าเดือนน", 1200.0).is_some());
    }

    #[test]
    fn test_unrelated_expense_is_not_flagged() {
        let recent = vec![expense("ค่าไฟฟ้าเดือนนี้", 1200.0)];
        assert!(find_duplicate_expense(&recent, "เงินเดือนพนักงาน", 1200.0).is_none());
    }

    #[test]
    fn test_same_description_different_amount_is_not_flagged() {
        let recent = vec![expense("ค่าไฟฟ้าเดือนนี้", 1200.0)];
        assert!(find_duplicate_expense(&recent, "ค่าไฟฟ้าเดือนนี้", 900.0).is_none());
    }

    #[test]
    fn test_default_lookback_is_24_hours() {
        assert_eq!(default_lookback(), Duration::hours(24));
    }
}
