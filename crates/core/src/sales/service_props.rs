//! Property-based tests for sale pricing and transitions.
//!
//! - Discount never exceeds the line subtotal
//! - Completion followed by cancellation nets every variant back to zero
//! - A completed sale can never be completed again

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use stockbook_shared::types::VariantId;

use super::error::SaleError;
use super::pricing::{line_amounts, sale_totals};
use super::service::SaleService;
use super::types::{SaleLine, SaleStatus};

/// Discount in `[0, 100)` with two decimal places.
fn discount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000).prop_map(|basis| Decimal::new(basis, 2))
}

fn sale_line(variants: Vec<VariantId>) -> impl Strategy<Value = SaleLine> {
    (0..variants.len(), 1i32..50, 1i64..100_000, discount()).prop_map(
        move |(idx, quantity, unit_price, discount_percentage)| SaleLine {
            variant_id: variants[idx],
            quantity,
            unit_price,
            discount_percentage,
        },
    )
}

fn sale_lines() -> impl Strategy<Value = Vec<SaleLine>> {
    let variants: Vec<VariantId> = (0..4).map(|_| VariantId::new()).collect();
    prop::collection::vec(sale_line(variants), 1..8)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_discount_bounded(
        quantity in 1i32..1_000,
        unit_price in 1i64..1_000_000,
        pct in discount(),
    ) {
        let line = SaleLine {
            variant_id: VariantId::new(),
            quantity,
            unit_price,
            discount_percentage: pct,
        };
        let amounts = line_amounts(&line).unwrap();
        prop_assert!(amounts.discount_amount >= 0);
        prop_assert!(amounts.discount_amount <= amounts.subtotal);
        prop_assert_eq!(amounts.total, amounts.subtotal - amounts.discount_amount);
    }

    #[test]
    fn prop_total_is_subtotal_plus_fee(lines in sale_lines(), delivery in any::<bool>()) {
        let totals = sale_totals(&lines, delivery).unwrap();
        prop_assert_eq!(totals.total, totals.subtotal + totals.delivery_fee);
        if !delivery {
            prop_assert_eq!(totals.delivery_fee, 0);
        }
    }

    #[test]
    fn prop_complete_then_cancel_restores_stock(lines in sale_lines()) {
        let stock: BTreeMap<VariantId, i32> = SaleService::variant_demand(&lines)
            .into_iter()
            .map(|(v, qty)| (v, i32::try_from(qty).unwrap()))
            .collect();

        let completion =
            SaleService::plan_completion(SaleStatus::Pending, &lines, &stock, false).unwrap();
        let cancellation = SaleService::plan_cancellation(SaleStatus::Completed, &lines).unwrap();

        let mut net: BTreeMap<VariantId, i32> = BTreeMap::new();
        for d in completion.debits.iter().chain(&cancellation.restorations) {
            *net.entry(d.variant_id).or_default() += d.delta;
        }
        prop_assert!(net.values().all(|n| *n == 0));

        let again = SaleService::plan_completion(SaleStatus::Completed, &lines, &stock, false);
        prop_assert_eq!(again, Err(SaleError::AlreadyCompleted));
    }
}
