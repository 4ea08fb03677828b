//! # Cost Engine Module
//!
//! Pure arithmetic over purchases and recipes: unit price from total price
//! and quantity, stock-equivalent derivation via buy-to-stock ratio or an
//! actual-yield override, menu costing from recipe lines, and sale-price
//! suggestion from a target gross-profit margin.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::model::RecipeLine;

/// Default gross-profit margin target for suggested prices
pub const DEFAULT_TARGET_MARGIN: f64 = 0.6;

/// Result of deriving stock figures from a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDerivation {
    /// Quantity added to inventory, in stock units
    pub stock_quantity: f64,
    /// Cost per stock unit; 0 when stock_quantity is 0 (defined degenerate
    /// case, not an error)
    pub cost_per_stock_unit: f64,
}

/// Per-line breakdown of a menu costing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCost {
    pub ingredient_name: String,
    pub quantity_per_serve: f64,
    pub unit_cost: f64,
    pub line_cost: f64,
}

/// Total menu cost with its per-line breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuCosting {
    pub total_cost: f64,
    pub lines: Vec<LineCost>,
}

/// Unit price = total price / quantity
///
/// Callers must have validated quantity > 0 already; a non-positive quantity
/// here is an invariant violation and fails with `DivisionByZero`.
pub fn unit_price(total_price: f64, quantity: f64) -> Result<f64, LedgerError> {
    if quantity <= 0.0 {
        return Err(LedgerError::DivisionByZero(format!(
            "unit price with quantity {quantity}"
        )));
    }
    Ok(total_price / quantity)
}

/// Derive the stock-equivalent quantity and cost per stock unit
///
/// When `actual_yield` is supplied and positive, it overrides the
/// ratio-based derivation: stock quantity equals the yield regardless of
/// ratio. Otherwise stock quantity = quantity bought / ratio.
pub fn stock_equivalent(
    quantity_bought: f64,
    total_price: f64,
    ratio: f64,
    actual_yield: Option<f64>,
) -> StockDerivation {
    let stock_quantity = match actual_yield {
        Some(yield_qty) if yield_qty > 0.0 => yield_qty,
        _ => {
            if ratio > 0.0 {
                quantity_bought / ratio
            } else {
                quantity_bought
            }
        }
    };
    let cost_per_stock_unit = if stock_quantity > 0.0 {
        total_price / stock_quantity
    } else {
        0.0
    };
    debug!(
        "Stock derivation: bought {quantity_bought} -> {stock_quantity} stock units at {cost_per_stock_unit}/unit"
    );
    StockDerivation {
        stock_quantity,
        cost_per_stock_unit,
    }
}

/// Sum recipe-line ingredient costs for one serving
///
/// `unit_cost_of` supplies the current cost per stock unit for an
/// ingredient name; a line whose ingredient it cannot price fails the whole
/// costing with `IngredientNotFound`; a recipe referencing an unpriced
/// ingredient must fail loudly, not cost the menu short.
pub fn menu_cost<F>(recipe_lines: &[RecipeLine], unit_cost_of: F) -> Result<MenuCosting, LedgerError>
where
    F: Fn(&str) -> Option<f64>,
{
    let mut lines = Vec::with_capacity(recipe_lines.len());
    let mut total_cost = 0.0;

    for line in recipe_lines {
        let unit_cost = unit_cost_of(&line.ingredient_name)
            .ok_or_else(|| LedgerError::IngredientNotFound(line.ingredient_name.clone()))?;
        let line_cost = line.quantity_per_serve * unit_cost;
        total_cost += line_cost;
        lines.push(LineCost {
            ingredient_name: line.ingredient_name.clone(),
            quantity_per_serve: line.quantity_per_serve,
            unit_cost,
            line_cost,
        });
    }

    Ok(MenuCosting { total_cost, lines })
}

/// Suggested sale price from cost and a target GP margin fraction
///
/// margin 0.6 means a price of cost / 0.4. Fails with `InvalidMargin` when
/// the margin fraction is >= 1.
pub fn suggested_price(cost: f64, target_margin_fraction: f64) -> Result<f64, LedgerError> {
    if target_margin_fraction >= 1.0 {
        return Err(LedgerError::InvalidMargin(target_margin_fraction));
    }
    Ok(cost / (1.0 - target_margin_fraction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::CanonicalUnit;

    fn line(name: &str, qty: f64) -> RecipeLine {
        RecipeLine {
            menu_id: "m1".to_string(),
            ingredient_name: name.to_string(),
            quantity_per_serve: qty,
            unit: CanonicalUnit::Kilogram,
        }
    }

    #[test]
    fn test_unit_price_basic() {
        assert_eq!(unit_price(500.0, 5.0).unwrap(), 100.0);
        assert_eq!(unit_price(100.0, 3.0).unwrap(), 100.0 / 3.0);
    }

    #[test]
    fn test_unit_price_round_trip() {
        // unitPrice(total, qty) * qty ~= total within float tolerance
        for (total, qty) in [(500.0, 5.0), (99.9, 0.3), (1234.56, 7.0)] {
            let up = unit_price(total, qty).unwrap();
            assert!((up * qty - total).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unit_price_rejects_non_positive_quantity() {
        assert!(matches!(
            unit_price(500.0, 0.0),
            Err(LedgerError::DivisionByZero(_))
        ));
        assert!(matches!(
            unit_price(500.0, -1.0),
            Err(LedgerError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_stock_equivalent_ratio_path() {
        // ratio > 0 => stock = quantity / ratio
        let d = stock_equivalent(5.0, 500.0, 1.0, None);
        assert_eq!(d.stock_quantity, 5.0);
        assert_eq!(d.cost_per_stock_unit, 100.0);

        let d = stock_equivalent(2.0, 400.0, 0.5, None);
        assert_eq!(d.stock_quantity, 4.0);
        assert_eq!(d.cost_per_stock_unit, 100.0);
    }

    #[test]
    fn test_stock_equivalent_yield_override() {
        // actual yield wins regardless of ratio
        let d = stock_equivalent(5.0, 500.0, 2.0, Some(4.0));
        assert_eq!(d.stock_quantity, 4.0);
        assert_eq!(d.cost_per_stock_unit, 125.0);
    }

    #[test]
    fn test_stock_equivalent_ignores_non_positive_yield() {
        let d = stock_equivalent(5.0, 500.0, 1.0, Some(0.0));
        assert_eq!(d.stock_quantity, 5.0);
    }

    #[test]
    fn test_stock_equivalent_zero_is_degenerate_not_error() {
        let d = stock_equivalent(0.0, 500.0, 1.0, None);
        assert_eq!(d.stock_quantity, 0.0);
        assert_eq!(d.cost_per_stock_unit, 0.0);
    }

    #[test]
    fn test_menu_cost_two_lines() {
        // 0.3 units at 10/unit + 0.1 units at 50/unit = 8.0
        let lines = vec![line("A", 0.3), line("B", 0.1)];
        let costing = menu_cost(&lines, |name| match name {
            "A" => Some(10.0),
            "B" => Some(50.0),
            _ => None,
        })
        .unwrap();
        assert!((costing.total_cost - 8.0).abs() < 1e-9);
        assert_eq!(costing.lines.len(), 2);
        assert!((costing.lines[0].line_cost - 3.0).abs() < 1e-9);
        assert!((costing.lines[1].line_cost - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_menu_cost_unresolved_ingredient_fails_loudly() {
        let lines = vec![line("A", 0.3), line("หายไป", 0.1)];
        let result = menu_cost(&lines, |name| if name == "A" { Some(10.0) } else { None });
        assert!(matches!(result, Err(LedgerError::IngredientNotFound(n)) if n == "หายไป"));
    }

    #[test]
    fn test_suggested_price() {
        // margin 0.6 => price = cost / 0.4
        assert!((suggested_price(8.0, 0.6).unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(suggested_price(10.0, 0.0).unwrap(), 10.0);
    }

    #[test]
    fn test_suggested_price_invalid_margin() {
        assert!(matches!(
            suggested_price(8.0, 1.0),
            Err(LedgerError::InvalidMargin(_))
        ));
        assert!(matches!(
            suggested_price(8.0, 1.5),
            Err(LedgerError::InvalidMargin(_))
        ));
    }
}
