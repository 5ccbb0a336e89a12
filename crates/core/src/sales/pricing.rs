//! Sale arithmetic.
//!
//! Amounts are integers in the smallest currency unit; discounts are decimal
//! percentages. Every rounding step uses banker's rounding (round half to
//! even) on exact decimal values.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::SaleError;
use super::types::SaleLine;

/// Delivery surcharge as a fraction of the sale subtotal (5%).
pub const DELIVERY_FEE_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Amounts of a single sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAmounts {
    /// Quantity times unit price.
    pub subtotal: i64,
    /// Rounded discount.
    pub discount_amount: i64,
    /// Subtotal less discount.
    pub total: i64,
}

/// Amounts of a whole sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    /// Sum of line totals.
    pub subtotal: i64,
    /// Delivery surcharge, zero when delivery is not required.
    pub delivery_fee: i64,
    /// Subtotal plus delivery fee.
    pub total: i64,
}

fn round_to_unit(value: Decimal) -> Result<i64, SaleError> {
    i64::try_from(value.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven))
        .map_err(|_| SaleError::AmountOverflow)
}

/// Computes subtotal, discount and total for one line.
///
/// # Errors
///
/// Returns `AmountOverflow` if the subtotal does not fit an `i64`.
pub fn line_amounts(line: &SaleLine) -> Result<LineAmounts, SaleError> {
    let subtotal = i64::from(line.quantity)
        .checked_mul(line.unit_price)
        .ok_or(SaleError::AmountOverflow)?;
    let discount_amount =
        round_to_unit(Decimal::from(subtotal) * line.discount_percentage / ONE_HUNDRED)?;

    Ok(LineAmounts {
        subtotal,
        discount_amount,
        total: subtotal - discount_amount,
    })
}

/// Delivery fee for a subtotal.
///
/// # Errors
///
/// Returns `AmountOverflow` if the fee does not fit an `i64`.
pub fn delivery_fee(subtotal: i64, delivery_required: bool) -> Result<i64, SaleError> {
    if delivery_required {
        round_to_unit(Decimal::from(subtotal) * DELIVERY_FEE_RATE)
    } else {
        Ok(0)
    }
}

/// Computes the totals of a sale.
///
/// # Errors
///
/// Returns `AmountOverflow` if any amount does not fit an `i64`.
pub fn sale_totals(lines: &[SaleLine], delivery_required: bool) -> Result<SaleTotals, SaleError> {
    let mut subtotal: i64 = 0;
    for line in lines {
        subtotal = subtotal
            .checked_add(line_amounts(line)?.total)
            .ok_or(SaleError::AmountOverflow)?;
    }
    let delivery_fee = delivery_fee(subtotal, delivery_required)?;

    Ok(SaleTotals {
        subtotal,
        delivery_fee,
        total: subtotal
            .checked_add(delivery_fee)
            .ok_or(SaleError::AmountOverflow)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use stockbook_shared::types::VariantId;

    fn line(quantity: i32, unit_price: i64, pct: Decimal) -> SaleLine {
        SaleLine {
            variant_id: VariantId::new(),
            quantity,
            unit_price,
            discount_percentage: pct,
        }
    }

    #[test]
    fn test_delivery_fee_rate() {
        assert_eq!(DELIVERY_FEE_RATE, dec!(0.05));
    }

    #[test]
    fn test_reference_sale() {
        // 2 @ 1000 with 10% + 1 @ 500, delivery required.
        let lines = [line(2, 1000, dec!(10)), line(1, 500, Decimal::ZERO)];

        let first = line_amounts(&lines[0]).unwrap();
        assert_eq!(first.subtotal, 2000);
        assert_eq!(first.discount_amount, 200);
        assert_eq!(first.total, 1800);

        let totals = sale_totals(&lines, true).unwrap();
        assert_eq!(totals.subtotal, 2300);
        assert_eq!(totals.delivery_fee, 115);
        assert_eq!(totals.total, 2415);
    }

    #[test]
    fn test_no_delivery_no_fee() {
        let totals = sale_totals(&[line(3, 999, Decimal::ZERO)], false).unwrap();
        assert_eq!(totals.delivery_fee, 0);
        assert_eq!(totals.total, 2997);
    }

    #[rstest]
    // 250 * 1% = 2.5 -> 2
    #[case(1, 250, dec!(1), 2)]
    // 350 * 1% = 3.5 -> 4
    #[case(1, 350, dec!(1), 4)]
    // 3 * 333 * 33.33% = 332.96... -> 333
    #[case(3, 333, dec!(33.33), 333)]
    #[case(5, 100, dec!(0), 0)]
    fn test_discount_bankers_rounding(
        #[case] qty: i32,
        #[case] price: i64,
        #[case] pct: Decimal,
        #[case] expected: i64,
    ) {
        assert_eq!(line_amounts(&line(qty, price, pct)).unwrap().discount_amount, expected);
    }

    #[rstest]
    // 50 * 5% = 2.5 -> 2, 70 * 5% = 3.5 -> 4
    #[case(50, 2)]
    #[case(70, 4)]
    #[case(2300, 115)]
    #[case(0, 0)]
    fn test_delivery_fee_rounding(#[case] subtotal: i64, #[case] expected: i64) {
        assert_eq!(delivery_fee(subtotal, true).unwrap(), expected);
    }

    #[test]
    fn test_overflow_reported() {
        let err = line_amounts(&line(i32::MAX, i64::MAX, Decimal::ZERO)).unwrap_err();
        assert_eq!(err, SaleError::AmountOverflow);
    }
}
