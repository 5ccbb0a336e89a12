//! Sale service for validation and status transitions.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use stockbook_shared::types::VariantId;

use super::error::SaleError;
use super::pricing;
use super::types::{CancellationPlan, CompletionPlan, SaleLine, SaleStatus, Shortage, StockDelta};

/// Sale service.
///
/// Validates sale lines, checks stock across lines, and plans the stock
/// deltas of completion and cancellation.
pub struct SaleService;

impl SaleService {
    /// Validates a single priced line, returning every problem found.
    #[must_use]
    pub fn line_issues(line: &SaleLine) -> Vec<&'static str> {
        let mut issues = Vec::new();
        if line.quantity < 1 {
            issues.push("quantity must be at least 1");
        }
        if line.unit_price < 1 {
            issues.push("unit price must be at least 1");
        }
        if line.discount_percentage < Decimal::ZERO
            || line.discount_percentage >= Decimal::ONE_HUNDRED
        {
            issues.push("discount must be at least 0 and below 100");
        }
        if line.discount_percentage.normalize().scale() > 2 {
            issues.push("discount allows at most two decimal places");
        }
        issues
    }

    /// Validates the lines of a new sale.
    ///
    /// # Errors
    ///
    /// - `EmptySale` if there are no lines.
    /// - `InvalidLine` listing every malformed line.
    pub fn validate_lines(lines: &[SaleLine]) -> Result<(), SaleError> {
        if lines.is_empty() {
            return Err(SaleError::EmptySale);
        }

        let issues: Vec<String> = lines
            .iter()
            .enumerate()
            .flat_map(|(idx, line)| {
                Self::line_issues(line)
                    .into_iter()
                    .map(move |issue| format!("item {}: {issue}", idx + 1))
            })
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(SaleError::InvalidLine(issues))
        }
    }

    /// Total quantity requested per variant across all lines.
    #[must_use]
    pub fn variant_demand(lines: &[SaleLine]) -> BTreeMap<VariantId, i64> {
        let mut demand = BTreeMap::new();
        for line in lines {
            *demand.entry(line.variant_id).or_insert(0) += i64::from(line.quantity);
        }
        demand
    }

    /// Checks aggregated demand against stock on hand.
    ///
    /// Variants missing from `stock` count as having nothing on hand.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStock` listing every short variant.
    pub fn check_stock(
        lines: &[SaleLine],
        stock: &BTreeMap<VariantId, i32>,
    ) -> Result<(), SaleError> {
        let shortages: Vec<Shortage> = Self::variant_demand(lines)
            .into_iter()
            .filter_map(|(variant_id, requested)| {
                let available = stock.get(&variant_id).copied().unwrap_or(0);
                (requested > i64::from(available)).then_some(Shortage {
                    variant_id,
                    available,
                    requested,
                })
            })
            .collect();

        if shortages.is_empty() {
            Ok(())
        } else {
            Err(SaleError::InsufficientStock(shortages))
        }
    }

    /// Plans the completion of a sale.
    ///
    /// # Errors
    ///
    /// - `EmptySale` if the sale has no lines.
    /// - `AlreadyCompleted` / `SaleCancelled` unless the sale is pending.
    /// - `InsufficientStock` if any variant is short.
    pub fn plan_completion(
        status: SaleStatus,
        lines: &[SaleLine],
        stock: &BTreeMap<VariantId, i32>,
        delivery_required: bool,
    ) -> Result<CompletionPlan, SaleError> {
        if lines.is_empty() {
            return Err(SaleError::EmptySale);
        }
        match status {
            SaleStatus::Completed => return Err(SaleError::AlreadyCompleted),
            SaleStatus::Cancelled => return Err(SaleError::SaleCancelled),
            SaleStatus::Pending => {}
        }

        Self::check_stock(lines, stock)?;
        let totals = pricing::sale_totals(lines, delivery_required)?;

        Ok(CompletionPlan {
            debits: Self::deltas(lines, -1),
            delivery_fee: totals.delivery_fee,
        })
    }

    /// Plans the cancellation of a sale.
    ///
    /// Completed sales restore every line's quantity; pending sales move no
    /// stock.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCancelled` for cancelled sales.
    pub fn plan_cancellation(
        status: SaleStatus,
        lines: &[SaleLine],
    ) -> Result<CancellationPlan, SaleError> {
        let restorations = match status {
            SaleStatus::Cancelled => return Err(SaleError::AlreadyCancelled),
            SaleStatus::Pending => Vec::new(),
            SaleStatus::Completed => Self::deltas(lines, 1),
        };
        Ok(CancellationPlan { restorations })
    }

    /// Validates that a sale can be deleted.
    ///
    /// # Errors
    ///
    /// Returns `CannotDelete` for completed sales.
    pub fn validate_can_delete(status: SaleStatus) -> Result<(), SaleError> {
        if status == SaleStatus::Completed {
            Err(SaleError::CannotDelete(status))
        } else {
            Ok(())
        }
    }

    /// Resolves the unit price of a new line.
    #[must_use]
    pub fn resolve_unit_price(requested: Option<i64>, variant_price: i64) -> i64 {
        requested.unwrap_or(variant_price)
    }

    fn deltas(lines: &[SaleLine], sign: i32) -> Vec<StockDelta> {
        let mut deltas: Vec<StockDelta> = lines
            .iter()
            .map(|line| StockDelta {
                variant_id: line.variant_id,
                delta: sign * line.quantity,
            })
            .collect();
        deltas.sort_by_key(|d| d.variant_id);
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn line(variant_id: VariantId, quantity: i32) -> SaleLine {
        SaleLine {
            variant_id,
            quantity,
            unit_price: 1000,
            discount_percentage: Decimal::ZERO,
        }
    }

    fn stock(entries: &[(VariantId, i32)]) -> BTreeMap<VariantId, i32> {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_plan_completion_debits_each_line() {
        let v = VariantId::new();
        let lines = [line(v, 2), line(v, 1)];
        let plan =
            SaleService::plan_completion(SaleStatus::Pending, &lines, &stock(&[(v, 3)]), false)
                .unwrap();
        assert_eq!(plan.debits.len(), 2);
        assert_eq!(plan.debits.iter().map(|d| d.delta).sum::<i32>(), -3);
        assert_eq!(plan.delivery_fee, 0);
    }

    #[test]
    fn test_demand_is_aggregated_per_variant() {
        // Two lines of 2 each fit individually into 3 units, but not together.
        let v = VariantId::new();
        let lines = [line(v, 2), line(v, 2)];
        let err =
            SaleService::plan_completion(SaleStatus::Pending, &lines, &stock(&[(v, 3)]), false)
                .unwrap_err();
        assert_eq!(
            err,
            SaleError::InsufficientStock(vec![Shortage {
                variant_id: v,
                available: 3,
                requested: 4
            }])
        );
    }

    #[test]
    fn test_every_shortage_reported() {
        let a = VariantId::new();
        let b = VariantId::new();
        let c = VariantId::new();
        let lines = [line(a, 5), line(b, 1), line(c, 2)];
        let err = SaleService::plan_completion(
            SaleStatus::Pending,
            &lines,
            &stock(&[(a, 1), (b, 1)]),
            false,
        )
        .unwrap_err();
        let SaleError::InsufficientStock(shortages) = err else {
            panic!("expected shortages");
        };
        assert_eq!(shortages.len(), 2);
        assert!(shortages.iter().any(|s| s.variant_id == c && s.available == 0));
    }

    #[rstest]
    #[case(SaleStatus::Completed, SaleError::AlreadyCompleted)]
    #[case(SaleStatus::Cancelled, SaleError::SaleCancelled)]
    fn test_completion_requires_pending(#[case] status: SaleStatus, #[case] expected: SaleError) {
        let v = VariantId::new();
        let err = SaleService::plan_completion(status, &[line(v, 1)], &stock(&[(v, 9)]), false)
            .unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn test_empty_sale_rejected() {
        let err = SaleService::plan_completion(SaleStatus::Pending, &[], &BTreeMap::new(), true)
            .unwrap_err();
        assert_eq!(err, SaleError::EmptySale);
        assert_eq!(SaleService::validate_lines(&[]), Err(SaleError::EmptySale));
    }

    #[test]
    fn test_completion_recomputes_delivery_fee() {
        let v = VariantId::new();
        let plan = SaleService::plan_completion(
            SaleStatus::Pending,
            &[line(v, 2)],
            &stock(&[(v, 2)]),
            true,
        )
        .unwrap();
        assert_eq!(plan.delivery_fee, 100);
    }

    #[test]
    fn test_cancellation_plans() {
        let v = VariantId::new();
        let lines = [line(v, 2), line(v, 3)];

        let plan = SaleService::plan_cancellation(SaleStatus::Completed, &lines).unwrap();
        assert_eq!(plan.restorations.iter().map(|d| d.delta).sum::<i32>(), 5);

        let plan = SaleService::plan_cancellation(SaleStatus::Pending, &lines).unwrap();
        assert!(plan.restorations.is_empty());

        assert_eq!(
            SaleService::plan_cancellation(SaleStatus::Cancelled, &lines),
            Err(SaleError::AlreadyCancelled)
        );
    }

    #[test]
    fn test_debits_sorted_by_variant() {
        let a = VariantId::new();
        let b = VariantId::new();
        let plan = SaleService::plan_completion(
            SaleStatus::Pending,
            &[line(b, 1), line(a, 1)],
            &stock(&[(a, 1), (b, 1)]),
            false,
        )
        .unwrap();
        assert!(plan.debits[0].variant_id <= plan.debits[1].variant_id);
    }

    #[rstest]
    #[case(1, 1, dec!(0), 0)]
    #[case(0, 1, dec!(0), 1)]
    #[case(1, 0, dec!(0), 1)]
    #[case(1, 1, dec!(100), 1)]
    #[case(1, 1, dec!(-1), 1)]
    #[case(1, 1, dec!(99.99), 0)]
    #[case(1, 1, dec!(12.345), 1)]
    #[case(1, 1, dec!(12.500), 0)]
    #[case(0, 0, dec!(100), 3)]
    fn test_line_issues(
        #[case] quantity: i32,
        #[case] unit_price: i64,
        #[case] pct: Decimal,
        #[case] expected: usize,
    ) {
        let line = SaleLine {
            variant_id: VariantId::new(),
            quantity,
            unit_price,
            discount_percentage: pct,
        };
        assert_eq!(SaleService::line_issues(&line).len(), expected);
    }

    #[test]
    fn test_validate_lines_numbers_items() {
        let v = VariantId::new();
        let Err(SaleError::InvalidLine(issues)) =
            SaleService::validate_lines(&[line(v, 1), line(v, 0)])
        else {
            panic!("expected invalid line");
        };
        assert_eq!(issues, vec!["item 2: quantity must be at least 1".to_string()]);
    }

    #[rstest]
    #[case(SaleStatus::Pending, true)]
    #[case(SaleStatus::Completed, false)]
    #[case(SaleStatus::Cancelled, true)]
    fn test_delete_rules(#[case] status: SaleStatus, #[case] allowed: bool) {
        assert_eq!(SaleService::validate_can_delete(status).is_ok(), allowed);
    }

    #[test]
    fn test_resolve_unit_price() {
        assert_eq!(SaleService::resolve_unit_price(None, 1200), 1200);
        assert_eq!(SaleService::resolve_unit_price(Some(900), 1200), 900);
    }
}
