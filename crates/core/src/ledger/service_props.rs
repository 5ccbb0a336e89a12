//! Property-based tests for StockLedger.
//!
//! - Counter never goes negative; rejected deltas leave the counter untouched
//! - Applied deltas replay back to the authoritative counter
//! - Entry normalization fixes the sign per entry type

use proptest::prelude::*;
use stockbook_shared::types::VariantId;

use super::error::LedgerError;
use super::service::StockLedger;
use super::types::{EntryType, StockChange};

/// Strategy for realistic stock levels.
fn stock_level() -> impl Strategy<Value = i32> {
    0i32..100_000
}

/// Strategy for non-zero deltas.
fn nonzero_delta() -> impl Strategy<Value = i32> {
    prop_oneof![-100_000i32..=-1, 1i32..=100_000]
}

fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![
        Just(EntryType::Addition),
        Just(EntryType::Adjustment),
        Just(EntryType::Damage),
        Just(EntryType::Return),
        Just(EntryType::Correction),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Insufficient stock is raised exactly when the result would be negative.
    #[test]
    fn prop_insufficient_iff_negative(stock in stock_level(), delta in nonzero_delta()) {
        let id = VariantId::new();
        let result = StockLedger::apply_delta(id, stock, delta);

        if stock + delta < 0 {
            let is_insufficient = matches!(result, Err(LedgerError::InsufficientStock { .. }));
            prop_assert!(is_insufficient);
        } else {
            let change = result.unwrap();
            prop_assert_eq!(change.previous_stock, stock);
            prop_assert_eq!(change.new_stock, stock + delta);
            prop_assert!(change.new_stock >= 0);
        }
    }

    /// Replaying only the accepted deltas rebuilds the running counter.
    #[test]
    fn prop_replay_matches_counter(deltas in prop::collection::vec(nonzero_delta(), 0..40)) {
        let id = VariantId::new();
        let mut counter = 0;
        let mut log: Vec<StockChange> = Vec::new();

        for delta in deltas {
            if let Ok(change) = StockLedger::apply_delta(id, counter, delta) {
                counter = change.new_stock;
                log.push(change);
            }
        }

        let report = StockLedger::replay_movements(0, &log);
        prop_assert!(report.matches(counter));
        prop_assert_eq!(report.applied, log.len());
    }

    /// Normalization keeps the magnitude and fixes the sign by type.
    #[test]
    fn prop_normalize_sign(entry_type in entry_type_strategy(), qty in nonzero_delta()) {
        let normalized = entry_type.normalize(qty).unwrap();
        prop_assert_eq!(normalized.abs(), qty.abs());

        match entry_type {
            EntryType::Damage => prop_assert!(normalized < 0),
            EntryType::Addition | EntryType::Return => prop_assert!(normalized > 0),
            EntryType::Adjustment | EntryType::Correction => prop_assert_eq!(normalized, qty),
        }
    }
}
