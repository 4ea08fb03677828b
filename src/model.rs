//! # Ledger Data Model
//!
//! This module defines the entities stored in the ledger: ingredients, the
//! append-only purchase and expense ledgers, and menus with their recipe
//! lines. Ledger rows are never updated in place; corrections are new rows,
//! preserving the audit trail.
//!
//! ## Core Concepts
//!
//! - **Stock unit / buy unit**: the unit an ingredient is measured in for
//!   inventory versus the unit it is purchased in, related by
//!   `buy_to_stock_ratio`.
//! - **Lot**: an identifier tagging a purchase batch for cost tracing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::units::CanonicalUnit;

/// The two kinds of named entity the resolver can look up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Ingredient,
    Menu,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Ingredient => "ingredient",
            EntityKind::Menu => "menu",
        }
    }
}

/// An inventory ingredient
///
/// Created by a purchase referencing an unknown name (auto-provisioned with
/// defaults) or by administrative entry. `stock` is always the stock-unit
/// quantity, never the buy-unit quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub stock_unit: CanonicalUnit,
    pub buy_unit: CanonicalUnit,
    /// Buy-to-stock ratio, always > 0 (default 1)
    pub buy_to_stock_ratio: f64,
    /// Threshold below which the ingredient is flagged as low stock
    pub min_stock: f64,
    /// Current stock level in stock units, non-negative
    pub stock: f64,
}

impl Ingredient {
    /// Create an ingredient with provisioning defaults (ratio 1, piece units)
    pub fn new(name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            stock_unit: CanonicalUnit::Piece,
            buy_unit: CanonicalUnit::Piece,
            buy_to_stock_ratio: 1.0,
            min_stock: 0.0,
            stock: 0.0,
        }
    }

    pub fn with_units(mut self, buy_unit: CanonicalUnit, stock_unit: CanonicalUnit) -> Self {
        self.buy_unit = buy_unit;
        self.stock_unit = stock_unit;
        self
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.buy_to_stock_ratio = ratio;
        self
    }

    pub fn with_min_stock(mut self, min_stock: f64) -> Self {
        self.min_stock = min_stock;
        self
    }

    /// Whether the current stock level is at or below the minimum threshold
    pub fn is_low_stock(&self) -> bool {
        self.min_stock > 0.0 && self.stock <= self.min_stock
    }
}

/// An immutable purchase ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub date: NaiveDate,
    pub ingredient_id: String,
    pub ingredient_name: String,
    /// Quantity bought in the (normalized) buy unit, always positive
    pub quantity: f64,
    pub unit: CanonicalUnit,
    pub total_price: f64,
    /// total_price / quantity
    pub unit_price: f64,
    /// Derived stock-unit quantity added to inventory
    pub stock_quantity: f64,
    /// Cost per stock unit after ratio or yield derivation
    pub cost_per_stock_unit: f64,
    /// Overrides ratio-based stock derivation when supplied
    pub actual_yield: Option<f64>,
    pub supplier: Option<String>,
    /// Generated batch identifier for cost tracing
    pub lot_id: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// An immutable expense ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    /// Non-empty free-text description
    pub description: String,
    /// Always positive
    pub amount: f64,
    /// Auto-assigned by the categorizer when absent on input
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// A sellable menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub id: String,
    pub name: String,
    /// Listed sale price
    pub price: f64,
    pub category: Option<String>,
}

/// One ingredient line of a menu recipe
///
/// Every line's ingredient must exist; the cost engine fails loudly when a
/// referenced ingredient cannot be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub menu_id: String,
    pub ingredient_name: String,
    /// Quantity per serving in the ingredient's stock unit
    pub quantity_per_serve: f64,
    pub unit: CanonicalUnit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_provisioning_defaults() {
        let ing = Ingredient::new("กุ้ง");
        assert_eq!(ing.name, "กุ้ง");
        assert_eq!(ing.buy_to_stock_ratio, 1.0);
        assert_eq!(ing.stock, 0.0);
        assert!(!ing.id.is_empty());
        assert!(!ing.is_low_stock());
    }

    #[test]
    fn test_ingredient_builder() {
        let ing = Ingredient::new("หมูสับ")
            .with_units(CanonicalUnit::Kilogram, CanonicalUnit::Gram)
            .with_ratio(0.001)
            .with_min_stock(500.0);
        assert_eq!(ing.buy_unit, CanonicalUnit::Kilogram);
        assert_eq!(ing.stock_unit, CanonicalUnit::Gram);
        assert_eq!(ing.buy_to_stock_ratio, 0.001);
        assert!(ing.is_low_stock()); // stock 0 <= min 500
    }

    #[test]
    fn test_low_stock_requires_threshold() {
        let mut ing = Ingredient::new("พริก");
        ing.stock = 0.0;
        // min_stock 0 means the threshold is unset
        assert!(!ing.is_low_stock());
        ing.min_stock = 2.0;
        ing.stock = 1.5;
        assert!(ing.is_low_stock());
        ing.stock = 3.0;
        assert!(!ing.is_low_stock());
    }

    #[test]
    fn test_entity_kind_labels() {
        assert_eq!(EntityKind::Ingredient.as_str(), "ingredient");
        assert_eq!(EntityKind::Menu.as_str(), "menu");
    }
}
