//! # Totals Engine
//!
//! The single implementation of invoice arithmetic. Extraction
//! post-processing, the editor and the renderer all call into this module;
//! there is no second copy of the formula anywhere in the workspace.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  item.amount      = quantity × rate                                     │
//! │  subtotal         = Σ item.amount                                       │
//! │  tax_amount       = subtotal × tax_rate / 100                           │
//! │                                                                         │
//! │  contribution(s)  = s.amount                      if s is Fixed         │
//! │                   = subtotal × s.amount / 100     if s is Percentage    │
//! │  surcharge_total  = Σ contribution(s)                                   │
//! │                                                                         │
//! │  total            = subtotal + tax_amount + surcharge_total             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Percentage surcharges are always taken on the item subtotal. They never
//! compound on tax or on each other, so their order does not matter.
//!
//! ## Degenerate Input
//! Non-finite numbers (NaN, ±∞) are read as zero. Nothing here returns an
//! error and nothing is rounded.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{InvoiceTotals, LineItem, Surcharge, SurchargeKind};

// =============================================================================
// Primitives
// =============================================================================

/// Maps non-finite values to zero.
#[inline]
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Amount of one line: `quantity × rate`.
#[inline]
pub fn line_amount(quantity: f64, rate: f64) -> f64 {
    sanitize(quantity) * sanitize(rate)
}

/// What one surcharge adds to the total, given the current item subtotal.
pub fn surcharge_contribution(surcharge: &Surcharge, subtotal: f64) -> f64 {
    let amount = sanitize(surcharge.amount);
    match surcharge.kind {
        SurchargeKind::Fixed => amount,
        SurchargeKind::Percentage => sanitize(subtotal) * amount / 100.0,
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Computes every derived figure of an invoice.
///
/// ## Example
/// ```rust
/// use paylance_core::totals::compute_totals;
/// use paylance_core::{LineItem, Surcharge, SurchargeKind};
///
/// let items = vec![LineItem::new("Website", 1.0, 1000.0)];
/// let surcharges = vec![Surcharge::new("Service", 10.0, SurchargeKind::Percentage)];
///
/// let totals = compute_totals(&items, &surcharges, 0.0);
/// assert_eq!(totals.surcharge_total, 100.0);
/// assert_eq!(totals.total, 1100.0);
/// ```
pub fn compute_totals(items: &[LineItem], surcharges: &[Surcharge], tax_rate: f64) -> InvoiceTotals {
    // Stored amounts are not trusted; quantity and rate are the source.
    let subtotal: f64 = items
        .iter()
        .map(|item| line_amount(item.quantity(), item.rate()))
        .sum();

    let tax_amount = subtotal * sanitize(tax_rate) / 100.0;

    let surcharge_total: f64 = surcharges
        .iter()
        .map(|surcharge| surcharge_contribution(surcharge, subtotal))
        .sum();

    InvoiceTotals {
        subtotal,
        tax_amount,
        surcharge_total,
        total: subtotal + tax_amount + surcharge_total,
    }
}

// =============================================================================
// Per-Surcharge Breakdown
// =============================================================================

/// A surcharge together with the amount it contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SurchargeLine {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: SurchargeKind,
    /// The surcharge's own `amount` (percent for percentage surcharges).
    pub rate: f64,
    /// Currency amount added to the total.
    pub contribution: f64,
}

/// Per-surcharge display amounts against a given subtotal.
///
/// The renderer passes the subtotal stored on the invoice so each line is
/// re-derived rather than read from a cache.
pub fn surcharge_breakdown(surcharges: &[Surcharge], subtotal: f64) -> Vec<SurchargeLine> {
    surcharges
        .iter()
        .map(|surcharge| SurchargeLine {
            description: surcharge.description.clone(),
            kind: surcharge.kind,
            rate: sanitize(surcharge.amount),
            contribution: surcharge_contribution(surcharge, subtotal),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixed(amount: f64) -> Surcharge {
        Surcharge::new("fixed", amount, SurchargeKind::Fixed)
    }

    fn percent(amount: f64) -> Surcharge {
        Surcharge::new("percent", amount, SurchargeKind::Percentage)
    }

    #[test]
    fn test_items_tax_and_fixed_surcharge() {
        let items = vec![LineItem::new("a", 2.0, 100.0), LineItem::new("b", 1.0, 50.0)];
        let totals = compute_totals(&items, &[fixed(25.0)], 10.0);

        assert_eq!(totals.subtotal, 250.0);
        assert_eq!(totals.tax_amount, 25.0);
        assert_eq!(totals.surcharge_total, 25.0);
        assert_eq!(totals.total, 300.0);
    }

    #[test]
    fn test_empty_invoice_is_zero() {
        let totals = compute_totals(&[], &[], 5.0);
        assert_eq!(totals, InvoiceTotals::default());
    }

    #[test]
    fn test_percentage_surcharge_without_tax() {
        let items = vec![LineItem::new("a", 1.0, 1000.0)];
        let totals = compute_totals(&items, &[percent(10.0)], 0.0);

        assert_eq!(totals.subtotal, 1000.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.surcharge_total, 100.0);
        assert_eq!(totals.total, 1100.0);
    }

    #[test]
    fn test_percentage_ignores_tax_and_other_surcharges() {
        let items = vec![LineItem::new("a", 1.0, 200.0)];
        let totals = compute_totals(&items, &[fixed(50.0), percent(10.0)], 20.0);

        // 10% of 200, not of 200 + 40 tax + 50 fixed
        assert_eq!(totals.surcharge_total, 70.0);
        assert_eq!(totals.total, 310.0);
    }

    #[test]
    fn test_non_finite_inputs_read_as_zero() {
        let items = vec![LineItem::new("a", f64::NAN, 10.0), LineItem::new("b", 2.0, 5.0)];
        let totals = compute_totals(&items, &[fixed(f64::INFINITY)], f64::NAN);

        assert_eq!(totals.subtotal, 10.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.surcharge_total, 0.0);
        assert_eq!(totals.total, 10.0);
    }

    #[test]
    fn test_breakdown_uses_given_subtotal() {
        let lines = surcharge_breakdown(&[percent(15.0), fixed(12.5)], 400.0);

        assert_eq!(lines[0].contribution, 60.0);
        assert_eq!(lines[0].rate, 15.0);
        assert_eq!(lines[1].contribution, 12.5);
    }

    fn item_strategy() -> impl Strategy<Value = LineItem> {
        (0.0f64..1_000.0, 0.0f64..10_000.0).prop_map(|(q, r)| LineItem::new("item", q, r))
    }

    fn surcharge_strategy() -> impl Strategy<Value = Surcharge> {
        (0.0f64..1_000.0, any::<bool>()).prop_map(|(amount, pct)| {
            if pct {
                percent(amount)
            } else {
                fixed(amount)
            }
        })
    }

    proptest! {
        #[test]
        fn prop_subtotal_is_sum_of_lines(items in prop::collection::vec(item_strategy(), 0..20)) {
            let totals = compute_totals(&items, &[], 0.0);
            let expected: f64 = items.iter().map(|i| i.quantity() * i.rate()).sum();
            prop_assert_eq!(totals.subtotal, expected);
        }

        #[test]
        fn prop_tax_is_percentage_of_subtotal(
            items in prop::collection::vec(item_strategy(), 0..10),
            tax_rate in 0.0f64..100.0,
        ) {
            let totals = compute_totals(&items, &[], tax_rate);
            prop_assert_eq!(totals.tax_amount, totals.subtotal * tax_rate / 100.0);
        }

        #[test]
        fn prop_zero_tax_rate_means_zero_tax(items in prop::collection::vec(item_strategy(), 0..10)) {
            prop_assert_eq!(compute_totals(&items, &[], 0.0).tax_amount, 0.0);
        }

        #[test]
        fn prop_fixed_contribution_ignores_subtotal(amount in 0.0f64..1e6, subtotal in 0.0f64..1e6) {
            prop_assert_eq!(surcharge_contribution(&fixed(amount), subtotal), amount);
        }

        #[test]
        fn prop_percentage_contribution_tracks_subtotal(amount in 0.0f64..100.0, subtotal in 0.0f64..1e6) {
            prop_assert_eq!(
                surcharge_contribution(&percent(amount), subtotal),
                subtotal * amount / 100.0
            );
        }

        #[test]
        fn prop_total_is_sum_of_parts(
            items in prop::collection::vec(item_strategy(), 0..10),
            surcharges in prop::collection::vec(surcharge_strategy(), 0..5),
            tax_rate in 0.0f64..50.0,
        ) {
            let totals = compute_totals(&items, &surcharges, tax_rate);
            let contributions: f64 = surcharges
                .iter()
                .map(|s| surcharge_contribution(s, totals.subtotal))
                .sum();

            prop_assert_eq!(totals.surcharge_total, contributions);
            prop_assert_eq!(
                totals.total,
                totals.subtotal + totals.tax_amount + totals.surcharge_total
            );
        }

        #[test]
        fn prop_compute_is_idempotent(
            items in prop::collection::vec(item_strategy(), 0..10),
            surcharges in prop::collection::vec(surcharge_strategy(), 0..5),
            tax_rate in 0.0f64..50.0,
        ) {
            prop_assert_eq!(
                compute_totals(&items, &surcharges, tax_rate),
                compute_totals(&items, &surcharges, tax_rate)
            );
        }

        #[test]
        fn prop_surcharge_order_does_not_matter(
            items in prop::collection::vec(item_strategy(), 1..5),
            surcharges in prop::collection::vec(surcharge_strategy(), 0..5),
        ) {
            let forward = compute_totals(&items, &surcharges, 0.0);
            let mut reversed_surcharges = surcharges.clone();
            reversed_surcharges.reverse();
            let reversed = compute_totals(&items, &reversed_surcharges, 0.0);

            let tolerance = 1e-9 * forward.total.abs().max(1.0);
            prop_assert!((forward.total - reversed.total).abs() <= tolerance);
        }
    }
}
