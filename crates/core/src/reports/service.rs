//! Report generation service.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use stockbook_shared::types::{CategoryId, VariantId};

use super::error::ReportError;
use super::types::{
    CategoryStock, InventoryReport, ProductSales, SalesReport, SoldLineRow, VariantStockRow,
};

/// Low-stock threshold used when none is configured.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// Number of best sellers listed in a sales report.
pub const TOP_PRODUCTS_LIMIT: usize = 5;

const STOCK_VALUE: &str = "stock value";
const REVENUE: &str = "revenue";

/// Sums amounts, failing on a missing (already overflowed) term or on overflow.
fn checked_sum(
    amounts: impl IntoIterator<Item = Option<i64>>,
    what: &'static str,
) -> Result<i64, ReportError> {
    amounts
        .into_iter()
        .try_fold(0_i64, |acc, amount| amount.and_then(|a| acc.checked_add(a)))
        .ok_or(ReportError::AmountOverflow(what))
}

/// Service for generating inventory and sales reports.
pub struct ReportService;

impl ReportService {
    /// Validates a report date range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` when `start` is after `end`.
    pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(())
    }

    /// Validates a low-stock threshold.
    ///
    /// # Errors
    ///
    /// Returns `InvalidThreshold` for negative values.
    pub fn validate_threshold(threshold: i32) -> Result<(), ReportError> {
        if threshold < 0 {
            return Err(ReportError::InvalidThreshold(threshold));
        }
        Ok(())
    }

    /// Builds the inventory report from the stock rows of active variants.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a stock value does not fit an `i64`.
    pub fn generate_inventory_report(
        rows: Vec<VariantStockRow>,
        low_stock_threshold: i32,
    ) -> Result<InventoryReport, ReportError> {
        let total_variants = rows.len() as u64;
        let total_units: i64 = rows.iter().map(|r| i64::from(r.stock_quantity)).sum();
        let total_value = checked_sum(rows.iter().map(VariantStockRow::stock_value), STOCK_VALUE)?;

        let mut by_category: BTreeMap<CategoryId, CategoryStock> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.category_active) {
            let entry = by_category
                .entry(row.category_id)
                .or_insert_with(|| CategoryStock {
                    category_id: row.category_id,
                    category_name: row.category_name.clone(),
                    variant_count: 0,
                    units: 0,
                    value: 0,
                });
            entry.variant_count += 1;
            entry.units += i64::from(row.stock_quantity);
            entry.value = checked_sum([Some(entry.value), row.stock_value()], STOCK_VALUE)?;
        }
        let mut by_category: Vec<CategoryStock> = by_category.into_values().collect();
        by_category.sort_by(|a, b| a.category_name.cmp(&b.category_name));

        let out_of_stock: Vec<VariantStockRow> = rows
            .iter()
            .filter(|r| r.stock_quantity == 0)
            .cloned()
            .collect();

        let mut low_stock: Vec<VariantStockRow> = rows
            .into_iter()
            .filter(|r| r.stock_quantity <= low_stock_threshold)
            .collect();
        low_stock.sort_by(|a, b| {
            a.stock_quantity
                .cmp(&b.stock_quantity)
                .then_with(|| a.product_name.cmp(&b.product_name))
                .then_with(|| a.variant_name.cmp(&b.variant_name))
        });

        Ok(InventoryReport {
            low_stock_threshold,
            total_variants,
            total_units,
            total_value,
            low_stock,
            out_of_stock,
            by_category,
        })
    }

    /// Builds the sales report from completed sale totals and their lines.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if revenue does not fit an `i64`.
    pub fn generate_sales_report(
        date_from: NaiveDate,
        date_to: NaiveDate,
        sale_totals: &[i64],
        lines: Vec<SoldLineRow>,
    ) -> Result<SalesReport, ReportError> {
        let sale_count = sale_totals.len() as u64;
        let revenue = checked_sum(sale_totals.iter().copied().map(Some), REVENUE)?;

        Ok(SalesReport {
            date_from,
            date_to,
            sale_count,
            revenue,
            average_sale: Self::average(revenue, sale_count),
            top_products: Self::top_products(lines, TOP_PRODUCTS_LIMIT)?,
        })
    }

    /// Aggregates sold lines per variant and keeps the best sellers by quantity.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if a variant's revenue does not fit an `i64`.
    pub fn top_products(
        lines: Vec<SoldLineRow>,
        limit: usize,
    ) -> Result<Vec<ProductSales>, ReportError> {
        let mut by_variant: BTreeMap<VariantId, ProductSales> = BTreeMap::new();
        for line in lines {
            let entry = by_variant
                .entry(line.variant_id)
                .or_insert_with(|| ProductSales {
                    variant_id: line.variant_id,
                    product_name: line.product_name,
                    variant_name: line.variant_name,
                    quantity_sold: 0,
                    revenue: 0,
                });
            entry.quantity_sold += i64::from(line.quantity);
            entry.revenue = checked_sum([Some(entry.revenue), Some(line.line_total)], REVENUE)?;
        }

        let mut products: Vec<ProductSales> = by_variant.into_values().collect();
        products.sort_by(|a, b| {
            b.quantity_sold
                .cmp(&a.quantity_sold)
                .then_with(|| b.revenue.cmp(&a.revenue))
                .then_with(|| a.variant_id.cmp(&b.variant_id))
        });
        products.truncate(limit);
        Ok(products)
    }

    fn average(revenue: i64, count: u64) -> i64 {
        if count == 0 {
            return 0;
        }
        let avg = (Decimal::from(revenue) / Decimal::from(count))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        i64::try_from(avg).unwrap_or(revenue)
    }
}
