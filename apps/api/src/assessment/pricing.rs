//! Cart pricing with volume discounts.
//!
//! Totals are computed in integer arithmetic: `base × (100 − percent) / 100`
//! rounded half up, so tier boundaries never suffer float drift.

use serde::Serialize;

use crate::assessment::selection::SelectionSet;
use crate::models::training::TrainingModule;

/// Price of one module, in Fcfa.
pub const MODULE_PRICE: u64 = 500;
pub const CURRENCY_SYMBOL: &str = "Fcfa";

/// Selection-count thresholds, highest first. Inclusive lower bounds.
const DISCOUNT_TIERS: &[(usize, u32)] = &[(13, 50), (9, 30), (5, 20)];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CartSummary {
    pub module_count: usize,
    pub base_price: u64,
    /// Fraction in {0, 0.20, 0.30, 0.50}.
    pub discount_rate: f64,
    pub total_price: u64,
}

/// Discount in whole percent for a number of selected modules.
pub fn discount_percent(count: usize) -> u32 {
    DISCOUNT_TIERS
        .iter()
        .find(|(threshold, _)| count >= *threshold)
        .map(|(_, percent)| *percent)
        .unwrap_or(0)
}

/// Prices the selected modules. Ids that are not in `modules` do not count.
pub fn compute_cart(
    selection: &SelectionSet,
    modules: &[TrainingModule],
    unit_price: u64,
) -> CartSummary {
    let module_count = selection
        .ids()
        .iter()
        .filter(|id| modules.iter().any(|m| &m.id == *id))
        .count();
    let base_price = module_count as u64 * unit_price;
    let percent = discount_percent(module_count);
    let total_price = (base_price * u64::from(100 - percent) + 50) / 100;

    CartSummary {
        module_count,
        base_price,
        discount_rate: f64::from(percent) / 100.0,
        total_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::training::fixtures::catalog;

    fn select_first(modules: &[TrainingModule], n: usize) -> SelectionSet {
        modules.iter().take(n).map(|m| m.id.clone()).collect()
    }

    fn quote(n: usize) -> CartSummary {
        let modules = catalog(16);
        compute_cart(&select_first(&modules, n), &modules, MODULE_PRICE)
    }

    #[test]
    fn test_empty_cart_is_free() {
        let cart = quote(0);
        assert_eq!(cart.total_price, 0);
        assert_eq!(cart.discount_rate, 0.0);
    }

    #[test]
    fn test_four_modules_no_discount() {
        let cart = quote(4);
        assert_eq!(cart.total_price, 2000);
        assert_eq!(cart.discount_rate, 0.0);
    }

    #[test]
    fn test_five_modules_twenty_percent() {
        let cart = quote(5);
        assert_eq!(cart.base_price, 2500);
        assert_eq!(cart.total_price, 2000);
        assert_eq!(cart.discount_rate, 0.20);
    }

    #[test]
    fn test_nine_modules_thirty_percent() {
        let cart = quote(9);
        assert_eq!(cart.total_price, 3150);
        assert_eq!(cart.discount_rate, 0.30);
    }

    #[test]
    fn test_thirteen_modules_fifty_percent() {
        let cart = quote(13);
        assert_eq!(cart.total_price, 3250);
        assert_eq!(cart.discount_rate, 0.50);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(discount_percent(4), 0);
        assert_eq!(discount_percent(5), 20);
        assert_eq!(discount_percent(8), 20);
        assert_eq!(discount_percent(9), 30);
        assert_eq!(discount_percent(12), 30);
        assert_eq!(discount_percent(13), 50);
        assert_eq!(discount_percent(100), 50);
    }

    #[test]
    fn test_rounds_half_up() {
        // 13 × 1 × 0.5 = 6.5 → 7
        let modules = catalog(13);
        let cart = compute_cart(&select_first(&modules, 13), &modules, 1);
        assert_eq!(cart.total_price, 7);
        // 9 × 1 × 0.7 = 6.3 → 6
        let cart = compute_cart(&select_first(&modules, 9), &modules, 1);
        assert_eq!(cart.total_price, 6);
    }

    #[test]
    fn test_unknown_ids_are_not_priced() {
        let modules = catalog(3);
        let selection: SelectionSet = ["module-0", "does-not-exist"].into_iter().collect();
        let cart = compute_cart(&selection, &modules, MODULE_PRICE);
        assert_eq!(cart.module_count, 1);
        assert_eq!(cart.total_price, 500);
    }

    #[test]
    fn test_compute_cart_is_idempotent() {
        let modules = catalog(10);
        let selection = select_first(&modules, 7);
        let first = compute_cart(&selection, &modules, MODULE_PRICE);
        let second = compute_cart(&selection, &modules, MODULE_PRICE);
        assert_eq!(first, second);
    }
}
